//! The in-memory JSON value.
//!
//! [`Value`] is a cheap handle: cloning it shares the underlying variant
//! instead of copying the tree. Scalars are immutable; arrays and maps can
//! have their slots rebound through any handle that shares them, and every
//! other sharer sees the change. Rebinding a handle itself (see
//! [`Value::assign`]) only affects that handle.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use either::Either;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no child element '{0}'")]
    NoSuchKey(String),
    #[error("index {index} is out of bounds for an array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("{kind} value cannot be indexed by {access}")]
    NotIndexable { kind: Kind, access: Access },
    #[error("expected {expected} value, found {found}")]
    WrongType { expected: Kind, found: Kind },
    #[error("absent value cannot be stringified")]
    Absent,
    #[error("{0} would contain itself")]
    Cycle(Kind),
}

/// How a container access addressed its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Name,
    Index,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Name => "name",
            Access::Index => "index",
        })
    }
}

/// The seven kinds a [`Value`] can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Absent,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Map,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Absent => "absent",
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Map => "map",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker converting into a JSON `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Null;

/// Marker converting into the absent sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Absent;

pub(crate) enum Variant {
    Absent,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(RefCell<Vec<Value>>),
    Map(RefCell<BTreeMap<String, Value>>),
}

impl Variant {
    fn kind(&self) -> Kind {
        match self {
            Variant::Absent => Kind::Absent,
            Variant::Null => Kind::Null,
            Variant::Boolean(_) => Kind::Boolean,
            Variant::Number(_) => Kind::Number,
            Variant::String(_) => Kind::String,
            Variant::Array(_) => Kind::Array,
            Variant::Map(_) => Kind::Map,
        }
    }
}

/// Handle to a shared JSON variant.
#[derive(Clone)]
pub struct Value {
    variant: Rc<Variant>,
}

impl Value {
    fn from_variant(variant: Variant) -> Self {
        Self {
            variant: Rc::new(variant),
        }
    }

    pub(crate) fn variant(&self) -> &Variant {
        &self.variant
    }

    /// An empty map, same as [`Value::default`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absent() -> Self {
        Self::from_variant(Variant::Absent)
    }

    pub fn null() -> Self {
        Self::from_variant(Variant::Null)
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Self::from_variant(Variant::Array(RefCell::new(items.into_iter().collect())))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::from_variant(Variant::Map(RefCell::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Rebinds this handle and returns the handle it replaced.
    ///
    /// Other clones of the old handle keep the old variant.
    pub fn assign(&mut self, value: impl Into<Value>) -> Value {
        std::mem::replace(self, value.into())
    }

    pub fn kind(&self) -> Kind {
        self.variant.kind()
    }

    pub fn is_absent(&self) -> bool {
        matches!(*self.variant, Variant::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(*self.variant, Variant::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(*self.variant, Variant::Boolean(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(*self.variant, Variant::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(*self.variant, Variant::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(*self.variant, Variant::Array(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(*self.variant, Variant::Map(_))
    }

    /// Whether both handles share one variant.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.variant, &other.variant)
    }

    fn wrong_type(&self, expected: Kind) -> Error {
        Error::WrongType {
            expected,
            found: self.kind(),
        }
    }

    fn not_indexable(&self, access: Access) -> Error {
        Error::NotIndexable {
            kind: self.kind(),
            access,
        }
    }

    fn entries_cell(&self) -> Result<&RefCell<BTreeMap<String, Value>>, Error> {
        match &*self.variant {
            Variant::Map(entries) => Ok(entries),
            _ => Err(self.not_indexable(Access::Name)),
        }
    }

    fn items_cell(&self) -> Result<&RefCell<Vec<Value>>, Error> {
        match &*self.variant {
            Variant::Array(items) => Ok(items),
            _ => Err(self.not_indexable(Access::Index)),
        }
    }

    /// Looks up an existing map entry.
    pub fn get(&self, name: &str) -> Result<Value, Error> {
        self.entries_cell()?
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NoSuchKey(name.to_string()))
    }

    /// Looks up a map entry, inserting an absent one if it is missing.
    ///
    /// The returned [`Entry`] writes back into this map.
    pub fn get_or_insert(&self, name: &str) -> Result<Entry<'_>, Error> {
        self.entries_cell()?
            .borrow_mut()
            .entry(name.to_string())
            .or_insert_with(Value::absent);
        Ok(Entry {
            map: self,
            name: name.to_string(),
        })
    }

    /// Binds `name` to `value`, returning the previous entry or an absent
    /// value if there was none.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<Value, Error> {
        let entries = self.entries_cell()?;
        let value = value.into();
        if value.reaches(self) {
            return Err(Error::Cycle(self.kind()));
        }
        let previous = entries.borrow_mut().insert(name.to_string(), value);
        Ok(previous.unwrap_or_else(Value::absent))
    }

    pub fn at(&self, index: usize) -> Result<Value, Error> {
        let items = self.items_cell()?.borrow();
        match items.get(index) {
            Some(item) => Ok(item.clone()),
            None => Err(Error::IndexOutOfBounds {
                index,
                len: items.len(),
            }),
        }
    }

    /// Rebinds an existing array slot. Arrays never grow this way.
    pub fn set_at(&self, index: usize, value: impl Into<Value>) -> Result<Value, Error> {
        let items = self.items_cell()?;
        let value = value.into();
        if value.reaches(self) {
            return Err(Error::Cycle(self.kind()));
        }
        let mut items = items.borrow_mut();
        let len = items.len();
        if index >= len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        Ok(std::mem::replace(&mut items[index], value))
    }

    /// Whether `target` is this value or nested somewhere inside it.
    ///
    /// Shared subtrees are visited once.
    fn reaches(&self, target: &Value) -> bool {
        let mut seen: HashSet<*const Variant> = HashSet::new();
        let mut pending = vec![self.clone()];
        while let Some(value) = pending.pop() {
            if value.ptr_eq(target) {
                return true;
            }
            if !seen.insert(Rc::as_ptr(&value.variant)) {
                continue;
            }
            match &*value.variant {
                Variant::Array(items) => pending.extend(items.borrow().iter().cloned()),
                Variant::Map(entries) => pending.extend(entries.borrow().values().cloned()),
                _ => {}
            }
        }
        false
    }

    /// Number of elements or entries, `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match &*self.variant {
            Variant::Array(items) => Some(items.borrow().len()),
            Variant::Map(entries) => Some(entries.borrow().len()),
            _ => None,
        }
    }

    /// True for empty containers. Scalars are never empty.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Map keys in iteration order.
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.entries_cell()?.borrow().keys().cloned().collect())
    }

    pub fn entries(&self) -> Result<Vec<(String, Value)>, Error> {
        Ok(self
            .entries_cell()?
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Array elements or map values, in iteration order.
    ///
    /// Iterates over a snapshot, so the container may be modified while the
    /// iterator is alive.
    pub fn children(&self) -> Result<impl Iterator<Item = Value>, Error> {
        match &*self.variant {
            Variant::Array(items) => Ok(Either::Left(items.borrow().clone().into_iter())),
            Variant::Map(entries) => Ok(Either::Right(entries.borrow().clone().into_values())),
            _ => Err(self.not_indexable(Access::Index)),
        }
    }

    pub fn as_null(&self) -> Result<Null, Error> {
        match &*self.variant {
            Variant::Null => Ok(Null),
            _ => Err(self.wrong_type(Kind::Null)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, Error> {
        match &*self.variant {
            Variant::Boolean(b) => Ok(*b),
            _ => Err(self.wrong_type(Kind::Boolean)),
        }
    }

    pub fn as_f64(&self) -> Result<f64, Error> {
        match &*self.variant {
            Variant::Number(n) => Ok(*n),
            _ => Err(self.wrong_type(Kind::Number)),
        }
    }

    pub fn as_str(&self) -> Result<&str, Error> {
        match &*self.variant {
            Variant::String(s) => Ok(s),
            _ => Err(self.wrong_type(Kind::String)),
        }
    }

    pub fn as_string(&self) -> Result<String, Error> {
        self.as_str().map(str::to_string)
    }
}

/// A named slot in a map, returned by [`Value::get_or_insert`].
///
/// Reads and writes go through the map, so an assignment here is seen by
/// every handle sharing it.
#[derive(Debug)]
pub struct Entry<'a> {
    map: &'a Value,
    name: String,
}

impl Entry<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value currently bound to this slot.
    pub fn value(&self) -> Value {
        self.map.get(&self.name).unwrap_or_else(|_| Value::absent())
    }

    /// Binds the slot to `value`, returning what it held before.
    ///
    /// Fails with [`Error::Cycle`] if `value` contains the map.
    pub fn assign(&self, value: impl Into<Value>) -> Result<Value, Error> {
        self.map.set(&self.name, value)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::from_variant(Variant::Map(RefCell::default()))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (&*self.variant, &*other.variant) {
            (Variant::Absent, Variant::Absent) | (Variant::Null, Variant::Null) => true,
            (Variant::Boolean(a), Variant::Boolean(b)) => a == b,
            (Variant::Number(a), Variant::Number(b)) => a == b,
            (Variant::String(a), Variant::String(b)) => a == b,
            (Variant::Array(a), Variant::Array(b)) => *a.borrow() == *b.borrow(),
            (Variant::Map(a), Variant::Map(b)) => *a.borrow() == *b.borrow(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.variant {
            Variant::Absent => f.write_str("Absent"),
            Variant::Null => f.write_str("Null"),
            Variant::Boolean(b) => write!(f, "Boolean({:?})", b),
            Variant::Number(n) => write!(f, "Number({:?})", n),
            Variant::String(s) => write!(f, "String({:?})", s),
            Variant::Array(items) => f.debug_list().entries(items.borrow().iter()).finish(),
            Variant::Map(entries) => f.debug_map().entries(entries.borrow().iter()).finish(),
        }
    }
}

impl From<Absent> for Value {
    fn from(_: Absent) -> Self {
        Value::absent()
    }
}

impl From<Null> for Value {
    fn from(_: Null) -> Self {
        Value::null()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::from_variant(Variant::Boolean(b))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::from_variant(Variant::Number(n))
    }
}

macro_rules! from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::from(n as f64)
                }
            }
        )*
    };
}

from_number!(f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::from_variant(Variant::String(s))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::from(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::from(s.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::array(IntoIterator::into_iter(items).map(Into::into))
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(entries: BTreeMap<K, V>) -> Self {
        Value::map(entries.into_iter().map(|(k, v)| (k, v.into())))
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for Value {
    fn from(entries: HashMap<K, V>) -> Self {
        Value::map(entries.into_iter().map(|(k, v)| (k, v.into())))
    }
}

impl std::iter::FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::array(iter)
    }
}

impl<K: Into<String>> std::iter::FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::map(iter)
    }
}

macro_rules! try_from_value {
    ($($ty:ty => $method:ident),*) => {
        $(
            impl TryFrom<&Value> for $ty {
                type Error = Error;

                fn try_from(value: &Value) -> Result<Self, Self::Error> {
                    value.$method()
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self, Self::Error> {
                    value.$method()
                }
            }
        )*
    };
}

try_from_value!(Null => as_null, bool => as_bool, f64 => as_f64, String => as_string);
