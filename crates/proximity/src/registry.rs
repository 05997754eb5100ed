//! Disjoint-set registry: arena union-find over point slots.
//!
//! - `parent[s]` is the referent of slot `s`; roots refer to themselves.
//! - `size[r]` is the component cardinality, valid for roots only.
//! - Slots start unregistered; a point gets its entry when first observed.
//!
//! Union is by size; on equal sizes the smaller slot survives. Slots are handed
//! out in sweep order, so the smaller slot is the root encountered first.

const UNREGISTERED: u32 = u32::MAX;

#[derive(Clone, Debug)]
pub struct Registry {
    parent: Vec<u32>,
    size: Vec<u32>,
    registered: usize,
    components: usize,
}

impl Registry {
    /// Arena for `n` slots, none registered.
    ///
    /// Panics if `n` does not fit the `u32` slot space.
    pub fn new(n: usize) -> Self {
        assert!(
            n < UNREGISTERED as usize,
            "registry supports fewer than {UNREGISTERED} slots, got {n}"
        );
        Self {
            parent: vec![UNREGISTERED; n],
            size: vec![0; n],
            registered: 0,
            components: 0,
        }
    }

    /// Arena for `n` slots, every slot registered as a singleton.
    pub fn singletons(n: usize) -> Self {
        let mut reg = Self::new(n);
        for s in 0..n {
            reg.register(s);
        }
        reg
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    #[inline]
    pub fn is_registered(&self, s: usize) -> bool {
        self.parent[s] != UNREGISTERED
    }

    /// Create the singleton entry for `s`. Returns `false` if it already existed.
    pub fn register(&mut self, s: usize) -> bool {
        if self.is_registered(s) {
            return false;
        }
        self.parent[s] = s as u32;
        self.size[s] = 1;
        self.registered += 1;
        self.components += 1;
        true
    }

    /// Root of `s`, halving the path on the way.
    ///
    /// Panics if `s` was never registered.
    pub fn find(&mut self, s: usize) -> usize {
        assert!(self.is_registered(s), "find on unregistered slot {s}");
        let mut x = s;
        loop {
            let p = self.parent[x] as usize;
            if p == x {
                return x;
            }
            let gp = self.parent[p];
            self.parent[x] = gp;
            x = gp as usize;
        }
    }

    /// Root of `s` without compressing (for shared borrows).
    pub fn root(&self, s: usize) -> usize {
        assert!(self.is_registered(s), "root of unregistered slot {s}");
        let mut x = s;
        while self.parent[x] as usize != x {
            x = self.parent[x] as usize;
        }
        x
    }

    /// Merge the components of `a` and `b`.
    ///
    /// Returns `Some((survivor, absorbed))` when two components merged and
    /// `None` when they were already one.
    pub fn union(&mut self, a: usize, b: usize) -> Option<(usize, usize)> {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return None;
        }
        let (keep, gone) = match self.size[ra].cmp(&self.size[rb]) {
            std::cmp::Ordering::Greater => (ra, rb),
            std::cmp::Ordering::Less => (rb, ra),
            std::cmp::Ordering::Equal => (ra.min(rb), ra.max(rb)),
        };
        self.parent[gone] = keep as u32;
        self.size[keep] += self.size[gone];
        self.size[gone] = 0;
        self.components -= 1;
        Some((keep, gone))
    }

    #[inline]
    pub fn same(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Cardinality of the component rooted at `root`.
    #[inline]
    pub fn size(&self, root: usize) -> usize {
        debug_assert_eq!(self.parent[root] as usize, root, "size of non-root {root}");
        self.size[root] as usize
    }

    #[inline]
    pub fn registered(&self) -> usize {
        self.registered
    }

    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Sizes of all components, in root order.
    pub fn sizes(&self) -> Vec<usize> {
        (0..self.parent.len())
            .filter(|&s| self.parent[s] as usize == s)
            .map(|s| self.size[s] as usize)
            .collect()
    }

    /// Sizes of all components, largest first.
    pub fn sorted_sizes(&self) -> Vec<usize> {
        let mut sizes = self.sizes();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        let mut reg = Registry::new(3);
        assert!(reg.register(1));
        assert!(!reg.register(1));
        assert_eq!(reg.registered(), 1);
        assert_eq!(reg.components(), 1);
        assert!(!reg.is_registered(0));
    }

    #[test]
    fn union_by_size_keeps_larger_root() {
        let mut reg = Registry::singletons(5);
        // {3,4} size 2, then 0 joins: 0 is the smaller side.
        assert_eq!(reg.union(3, 4), Some((3, 4)));
        assert_eq!(reg.union(0, 4), Some((3, 0)));
        assert_eq!(reg.find(0), 3);
        assert_eq!(reg.size(3), 3);
        assert_eq!(reg.components(), 3);
        assert_eq!(reg.union(0, 3), None);
    }

    #[test]
    fn ties_keep_earlier_slot() {
        let mut reg = Registry::singletons(4);
        assert_eq!(reg.union(2, 1), Some((1, 2)));
        assert_eq!(reg.union(3, 0), Some((0, 3)));
        // equal sizes 2 vs 2
        assert_eq!(reg.union(3, 2), Some((0, 1)));
        assert_eq!(reg.find(2), 0);
    }

    #[test]
    fn chains_compress_and_sizes_sum() {
        let n = 64;
        let mut reg = Registry::singletons(n);
        for s in 1..n {
            reg.union(s - 1, s);
        }
        let root = reg.find(n - 1);
        assert_eq!(reg.root(0), root);
        assert_eq!(reg.size(root), n);
        assert_eq!(reg.sorted_sizes(), vec![n]);
    }

    #[test]
    fn sorted_sizes_descending() {
        let mut reg = Registry::singletons(6);
        reg.union(0, 1);
        reg.union(2, 3);
        reg.union(3, 4);
        assert_eq!(reg.sorted_sizes(), vec![3, 2, 1]);
        assert_eq!(reg.sizes().iter().sum::<usize>(), 6);
    }

    #[test]
    #[should_panic(expected = "unregistered")]
    fn find_unregistered_panics() {
        let mut reg = Registry::new(2);
        reg.find(1);
    }
}
