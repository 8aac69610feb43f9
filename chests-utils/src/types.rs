// Wrapper types making it harder to accidentaly use the wrong underlying type.

use std::{
    borrow::Cow,
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::math::{vector2::Vector2, vector3::Vector3};

/// Width of a chunk column in blocks, as a shift.
pub const CHUNK_SHIFT: i32 = 4;

// A chunk position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos(pub Vector2<i32>);

impl ChunkPos {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self(Vector2::new(x, z))
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.0.x
    }

    #[must_use]
    pub const fn z(&self) -> i32 {
        self.0.y
    }
}

// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.0.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.0.y
    }

    #[must_use]
    pub const fn z(&self) -> i32 {
        self.0.z
    }

    /// The chunk column this block sits in. Uses an arithmetic shift so
    /// negative coordinates floor instead of truncating towards zero.
    #[must_use]
    pub const fn chunk(&self) -> ChunkPos {
        ChunkPos::new(self.0.x >> CHUNK_SHIFT, self.0.z >> CHUNK_SHIFT)
    }

    /// Squared euclidean distance, exact in integers.
    #[must_use]
    pub fn distance_squared(&self, other: &BlockPos) -> u64 {
        self.0.distance_squared(&other.0)
    }

    #[must_use]
    pub fn distance(&self, other: &BlockPos) -> f64 {
        (self.distance_squared(other) as f64).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    pub namespace: Cow<'static, str>,
    pub path: Cow<'static, str>,
}

impl ResourceLocation {
    pub const VANILLA_NAMESPACE: &'static str = "minecraft";

    #[must_use]
    pub fn vanilla(path: String) -> Self {
        ResourceLocation {
            namespace: Cow::Borrowed(Self::VANILLA_NAMESPACE),
            path: Cow::Owned(path),
        }
    }

    #[must_use]
    pub const fn vanilla_static(path: &'static str) -> Self {
        ResourceLocation {
            namespace: Cow::Borrowed(Self::VANILLA_NAMESPACE),
            path: Cow::Borrowed(path),
        }
    }

    #[must_use]
    pub fn valid_namespace_char(namespace_char: char) -> bool {
        namespace_char == '_'
            || namespace_char == '-'
            || namespace_char.is_ascii_lowercase()
            || namespace_char.is_ascii_digit()
            || namespace_char == '.'
    }

    #[must_use]
    pub fn valid_path_char(path_char: char) -> bool {
        path_char == '_'
            || path_char == '-'
            || path_char.is_ascii_lowercase()
            || path_char.is_ascii_digit()
            || path_char == '/'
            || path_char == '.'
    }

    #[must_use]
    pub fn validate(namespace: &str, path: &str) -> bool {
        !path.is_empty()
            && namespace.chars().all(Self::valid_namespace_char)
            && path.chars().all(Self::valid_path_char)
    }
}

impl Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ResourceLocation {
    type Err = String;

    // A bare path is read as a vanilla location, like the game does.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s.split_once(':').unwrap_or((Self::VANILLA_NAMESPACE, s));

        if !ResourceLocation::validate(namespace, path) {
            return Err(format!("Invalid resource location: {s}"));
        }

        Ok(ResourceLocation {
            namespace: Cow::Owned(namespace.to_string()),
            path: Cow::Owned(path.to_string()),
        })
    }
}

impl Serialize for ResourceLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceLocation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A block inside a specific world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChestLocation {
    pub world: ResourceLocation,
    pub pos: BlockPos,
}

impl ChestLocation {
    #[must_use]
    pub fn new(world: ResourceLocation, x: i32, y: i32, z: i32) -> Self {
        Self {
            world,
            pos: BlockPos::new(x, y, z),
        }
    }

    #[must_use]
    pub fn chunk_key(&self) -> ChunkKey {
        ChunkKey {
            world: self.world.clone(),
            pos: self.pos.chunk(),
        }
    }
}

impl Display for ChestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}, {}, {}]",
            self.world,
            self.pos.x(),
            self.pos.y(),
            self.pos.z()
        )
    }
}

// A chunk column inside a specific world. Secondary index key of the chest registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub world: ResourceLocation,
    pub pos: ChunkPos,
}

impl ChunkKey {
    #[must_use]
    pub const fn new(world: ResourceLocation, pos: ChunkPos) -> Self {
        Self { world, pos }
    }
}
