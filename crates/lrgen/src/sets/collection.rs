// small set store: every set is an ordered Vec so elements can be read back by
// position. sets are referred to by handle, never by reference

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SetHandle(u32);

#[derive(Clone, Debug, Default)]
pub struct SetCollection<T> {
    sets: Vec<Vec<T>>,
}

impl<T: Copy + PartialEq> SetCollection<T> {
    pub fn new() -> Self {
        Self { sets: Vec::new() }
    }

    pub fn new_set(&mut self) -> SetHandle {
        let handle = SetHandle(self.sets.len() as u32);
        self.sets.push(Vec::new());
        handle
    }

    /// Adds `element`. With `unique_only`, an element already present is not added
    /// again. Returns whether the set grew.
    pub fn insert(&mut self, handle: SetHandle, element: T, unique_only: bool) -> bool {
        let set = &mut self.sets[handle.0 as usize];
        if unique_only && set.contains(&element) {
            return false;
        }
        set.push(element);
        true
    }

    /// Removes every copy of `element`. Returns whether anything was removed.
    pub fn remove(&mut self, handle: SetHandle, element: T) -> bool {
        let set = &mut self.sets[handle.0 as usize];
        let before = set.len();
        set.retain(|x| *x != element);
        set.len() != before
    }

    pub fn size(&self, handle: SetHandle) -> usize {
        self.sets[handle.0 as usize].len()
    }

    pub fn read_at(&self, handle: SetHandle, index: usize) -> Option<T> {
        self.sets[handle.0 as usize].get(index).copied()
    }

    pub fn contains(&self, handle: SetHandle, element: T) -> bool {
        self.sets[handle.0 as usize].contains(&element)
    }

    pub fn clear(&mut self, handle: SetHandle) {
        self.sets[handle.0 as usize].clear();
    }

    pub fn iter(&self, handle: SetHandle) -> impl Iterator<Item = T> + '_ {
        self.sets[handle.0 as usize].iter().copied()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
