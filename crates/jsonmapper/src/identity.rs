//! Object identity bookkeeping for id-based references.
//!
//! On the write side an object is written in full the first time its id is
//! seen and as a bare id afterwards. On the read side every id maps to a
//! shared cell: a reference seen before its object gets an empty cell that
//! is filled once the object itself is read.

use alloc::{collections::BTreeMap, rc::Rc};
use core::{any::Any, cell::OnceCell, fmt};

/// Opaque handle passed to
/// [`Deserializer::set_back_reference`](crate::Deserializer::set_back_reference).
///
/// The concrete type behind it is agreed upon between the serializer of the
/// managed side and the deserializer of the back side, usually an
/// `Rc<RefCell<Parent>>` or a `Weak` to one.
pub type BackReference = Rc<dyn Any>;

/// Identifier of an object that may be referenced from several places.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectId {
    Int(i64),
    Str(String),
}

impl From<i64> for ObjectId {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for ObjectId {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for ObjectId {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

/// Failure to bind an id to a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IdError {
    /// The id was already bound to a value of another type.
    TypeClash,
    /// The id was already bound to a value.
    Duplicate,
}

struct Slot {
    cell: Rc<dyn Any>,
    resolved: bool,
}

/// Maps object ids to the values they stand for during one read.
#[derive(Default)]
pub(crate) struct ObjectIdTable {
    slots: BTreeMap<ObjectId, Slot>,
}

impl fmt::Debug for ObjectIdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|(id, slot)| (id, slot.resolved)))
            .finish()
    }
}

impl ObjectIdTable {
    /// The cell for `id`, created empty if the id has not been seen yet.
    pub(crate) fn reference<T: 'static>(&mut self, id: ObjectId) -> Result<Rc<OnceCell<T>>, IdError> {
        let slot = self.slots.entry(id).or_insert_with(|| Slot {
            cell: Rc::new(OnceCell::<T>::new()),
            resolved: false,
        });
        Rc::clone(&slot.cell)
            .downcast::<OnceCell<T>>()
            .map_err(|_| IdError::TypeClash)
    }

    /// Binds `id` to `value` and returns the shared cell holding it.
    pub(crate) fn resolve<T: 'static>(&mut self, id: ObjectId, value: T) -> Result<Rc<OnceCell<T>>, IdError> {
        let cell = self.reference::<T>(id.clone())?;
        cell.set(value).map_err(|_| IdError::Duplicate)?;
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.resolved = true;
        }
        Ok(cell)
    }

    /// The first id that was referenced but never bound.
    pub(crate) fn first_unresolved(&self) -> Option<&ObjectId> {
        self.slots
            .iter()
            .find_map(|(id, slot)| (!slot.resolved).then_some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_reference_is_filled_on_resolve() {
        let mut table = ObjectIdTable::default();
        let early = table.reference::<String>(ObjectId::Int(1)).unwrap();
        assert!(early.get().is_none());
        assert_eq!(table.first_unresolved(), Some(&ObjectId::Int(1)));

        table.resolve(ObjectId::Int(1), "one".to_string()).unwrap();
        assert_eq!(early.get().map(String::as_str), Some("one"));
        assert_eq!(table.first_unresolved(), None);
    }

    #[test]
    fn rejects_duplicates_and_type_clashes() {
        let mut table = ObjectIdTable::default();
        table.resolve(ObjectId::from("a"), 1_i32).unwrap();
        assert_eq!(
            table.resolve(ObjectId::from("a"), 2_i32).unwrap_err(),
            IdError::Duplicate
        );
        assert_eq!(
            table.reference::<String>(ObjectId::from("a")).unwrap_err(),
            IdError::TypeClash
        );
    }

    #[test]
    fn display() {
        assert_eq!(ObjectId::Int(3).to_string(), "3");
        assert_eq!(ObjectId::from("x").to_string(), "\"x\"");
    }
}
