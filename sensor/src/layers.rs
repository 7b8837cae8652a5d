use num_traits::{One, PrimInt};

use crate::constants::{IGNORE_RAYCAST_LAYER, LAYER_COUNT};

/// Trait implemented by anything that names a single bit of a bitmask.
///
/// You choose the backing integer type via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // Equivalent to: 1 << index
        // NOTE: Ensure your `bit_index()` is < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A pure bitmask container.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    /// Every bit set.
    pub fn all() -> Self {
        Self { bits: !T::zero() }
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    /// Builder-style [`BitmaskFlags::remove`].
    pub fn without<U: FlagBitmask<Storage = T>>(mut self, tag: U) -> Self {
        self.remove(tag);
        self
    }
}

/// One of the 32 collision layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Layer(u8);

impl Layer {
    /// The layer bodies and statics live on unless told otherwise.
    pub const DEFAULT: Layer = Layer(0);

    /// Reserved layer for non-physical geometry that scene traces always skip.
    pub const IGNORE_RAYCAST: Layer = Layer(IGNORE_RAYCAST_LAYER);

    /// Returns `None` when `index` is not below [`LAYER_COUNT`].
    pub const fn new(index: u8) -> Option<Layer> {
        if (index as usize) < LAYER_COUNT {
            Some(Layer(index))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl FlagBitmask for Layer {
    type Storage = u32;

    fn bit_index(&self) -> u8 {
        self.0
    }
}

/// Set of layers a cast is allowed to hit.
pub type LayerMask = BitmaskFlags<u32>;

/// Symmetric table of layer pairs that do not interact.
///
/// `ignored[a]` has bit `b` set when layers `a` and `b` ignore each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerCollisionMatrix {
    ignored: [LayerMask; LAYER_COUNT],
}

impl LayerCollisionMatrix {
    /// Mark the pair `(a, b)` as ignoring (or interacting with) each other.
    pub fn set_ignore(&mut self, a: Layer, b: Layer, ignore: bool) {
        if ignore {
            self.ignored[a.0 as usize].add(b);
            self.ignored[b.0 as usize].add(a);
        } else {
            self.ignored[a.0 as usize].remove(b);
            self.ignored[b.0 as usize].remove(a);
        }
    }

    /// Builder-style [`LayerCollisionMatrix::set_ignore`] with `ignore = true`.
    pub fn with_ignored(mut self, a: Layer, b: Layer) -> Self {
        self.set_ignore(a, b, true);
        self
    }

    pub fn ignores(&self, a: Layer, b: Layer) -> bool {
        self.ignored[a.0 as usize].has(b)
    }

    /// Every layer that `layer` interacts with.
    pub fn collision_mask(&self, layer: Layer) -> LayerMask {
        LayerMask::new(!self.ignored[layer.0 as usize].bits)
    }

    /// Mask used by ground probes owned by a body on `layer`.
    ///
    /// Same as [`LayerCollisionMatrix::collision_mask`], but never includes
    /// [`Layer::IGNORE_RAYCAST`], even when the matrix does not ignore it.
    pub fn sensor_mask(&self, layer: Layer) -> LayerMask {
        self.collision_mask(layer).without(Layer::IGNORE_RAYCAST)
    }
}
