/// Monotonic id source for table cells, owned by a single export.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::starting_at(5000)
    }
}

impl IdGenerator {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// `<name>_<n>`, readable in the diagram source.
    pub fn table_id(&mut self, name: &str) -> String {
        format!("{}_{}", name, self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.table_id("User"), "User_5000");
        assert_eq!(ids.table_id("User"), "User_5001");
        assert_eq!(ids.next_id(), 5002);
    }

    #[test]
    fn test_fresh_generators_are_independent() {
        let mut a = IdGenerator::starting_at(1);
        let mut b = IdGenerator::starting_at(1);
        a.next_id();
        assert_eq!(a.table_id("T"), "T_2");
        assert_eq!(b.table_id("T"), "T_1");
    }
}
