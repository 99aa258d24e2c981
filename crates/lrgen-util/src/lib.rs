// typed indices into the per-phase arrays (items, states, rules, ...)
// the wrapped value is the dense position in the owning Vec
#[macro_export]
macro_rules! make_type_idx {
    ($(#[$meta:meta])* $vis:vis $type_idx_name:ident, $type_name:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $type_idx_name(u32);

        impl $type_idx_name {
            pub fn new(index: usize) -> $type_idx_name {
                $type_idx_name(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_push(vec: &mut Vec<$type_name>, val: $type_name) -> $type_idx_name {
                let idx = $type_idx_name(vec.len() as u32);
                vec.push(val);
                idx
            }
        }

        impl std::fmt::Display for $type_idx_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Index<$type_idx_name> for [$type_name] {
            type Output = $type_name;

            fn index(&self, index: $type_idx_name) -> &Self::Output {
                &self[index.0 as usize]
            }
        }

        impl std::ops::IndexMut<$type_idx_name> for [$type_name] {
            fn index_mut(&mut self, index: $type_idx_name) -> &mut Self::Output {
                &mut self[index.0 as usize]
            }
        }

        impl std::ops::Index<$type_idx_name> for Vec<$type_name> {
            type Output = $type_name;

            fn index(&self, index: $type_idx_name) -> &Self::Output {
                self.as_slice().index(index)
            }
        }

        impl std::ops::IndexMut<$type_idx_name> for Vec<$type_name> {
            fn index_mut(&mut self, index: $type_idx_name) -> &mut Self::Output {
                self.as_mut_slice().index_mut(index)
            }
        }
    };
}

/// Pushes `val` onto `vec` unless it is already present. Returns whether it was pushed.
/// Keeps insertion order, which the rule lists and action lists rely on.
pub fn push_unique<T: PartialEq>(vec: &mut Vec<T>, val: T) -> bool {
    if vec.contains(&val) {
        false
    } else {
        vec.push(val);
        true
    }
}
