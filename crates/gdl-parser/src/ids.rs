/// Sequential id source for declarations that omit an explicit id.
///
/// One allocator lives for exactly one parse, so repeated or concurrent
/// parses always start from `n0` / `e0`.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_node: usize,
    next_edge: usize,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next `n<k>` not rejected by `is_taken`.
    pub fn next_node_id(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        next_free("n", &mut self.next_node, is_taken)
    }

    /// Next `e<k>` not rejected by `is_taken`.
    pub fn next_edge_id(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        next_free("e", &mut self.next_edge, is_taken)
    }
}

fn next_free(prefix: &str, counter: &mut usize, is_taken: impl Fn(&str) -> bool) -> String {
    loop {
        let candidate = format!("{prefix}{counter}");
        *counter += 1;
        if !is_taken(&candidate) {
            return candidate;
        }
    }
}
