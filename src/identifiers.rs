use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::Deref,
    str::FromStr,
};

use chrono::{DateTime, Utc};
use deterministic_hash::DeterministicHasher;
use fxhash::FxHasher64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::{
    players::Player,
    rounds::Pairing,
    tournament::{Section, Tournament},
};

#[inline(always)]
fn id_hasher() -> DeterministicHasher<FxHasher64> {
    DeterministicHasher::new(FxHasher64::default())
}

/// Creates an ID (of any type) from a time and a hashable value.
///
/// Used to derive stable round/pairing ids from their players so that
/// re-running a pairing computation on an unchanged snapshot yields the
/// same identifiers rather than fresh random ones.
pub fn id_from_item<T, ID>(salt: DateTime<Utc>, item: T) -> TypeId<ID>
where
    T: Hash,
{
    let mut hasher = id_hasher();
    salt.hash(&mut hasher);
    let upper = hasher.finish();
    item.hash(&mut hasher);
    let lower = hasher.finish();
    Uuid::from_u64_pair(upper, lower).into()
}

/// Creates an ID (of any type) from a time and an iterator of hashable values.
pub fn id_from_list<I, T, ID>(salt: DateTime<Utc>, vals: I) -> TypeId<ID>
where
    I: Iterator<Item = T>,
    T: Hash,
{
    let mut hasher = id_hasher();
    salt.hash(&mut hasher);
    let upper = hasher.finish();
    for item in vals {
        item.hash(&mut hasher);
    }
    let lower = hasher.finish();
    Uuid::from_u64_pair(upper, lower).into()
}

#[derive(Debug)]
#[repr(C)]
/// A generic type-checked wrapper around a Uuid (reduces boilerplate and keeps
/// ids for different entities from being accidentally interchanged).
pub struct TypeId<T>(pub Uuid, PhantomData<T>);

/// A type-checked id for players
pub type PlayerId = TypeId<Player>;
/// A type-checked id for tournaments
pub type TournamentId = TypeId<Tournament>;
/// A type-checked id for sections within a tournament
pub type SectionId = TypeId<Section>;
/// A type-checked id for a single produced pairing
pub type PairingId = TypeId<Pairing>;

#[derive(Serialize, Deserialize, Debug, Clone, Hash, PartialEq, Eq)]
/// An enum for identifying a player, either by id or by the name under which
/// they registered (external inputs sometimes only carry a name).
pub enum PlayerIdentifier {
    /// The player's id
    Id(PlayerId),
    /// The player's name
    Name(String),
}

impl<T> TypeId<T> {
    /// Creates a new typed id from a Uuid
    pub fn new(id: Uuid) -> Self {
        Self(id, PhantomData)
    }
}

impl<T> Default for TypeId<T> {
    fn default() -> Self {
        Self(Uuid::default(), PhantomData)
    }
}

impl<T> Clone for TypeId<T> {
    fn clone(&self) -> Self {
        Self(self.0, PhantomData)
    }
}

impl<T> Copy for TypeId<T> {}

impl<T> Hash for TypeId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> PartialEq for TypeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T> Eq for TypeId<T> {}

impl<T> PartialOrd for TypeId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypeId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Deref for TypeId<T> {
    type Target = Uuid;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> From<TypeId<T>> for Uuid {
    fn from(other: TypeId<T>) -> Uuid {
        other.0
    }
}

impl<T> From<Uuid> for TypeId<T> {
    fn from(other: Uuid) -> TypeId<T> {
        TypeId(other, PhantomData)
    }
}

impl From<PlayerId> for PlayerIdentifier {
    fn from(other: PlayerId) -> PlayerIdentifier {
        PlayerIdentifier::Id(other)
    }
}

impl<'de, T> Deserialize<'de> for TypeId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Uuid::deserialize(deserializer).map(|id| id.into())
    }
}

impl<T> Serialize for TypeId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> FromStr for TypeId<T> {
    type Err = <Uuid as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Into::into)
    }
}

impl<T> Display for TypeId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
