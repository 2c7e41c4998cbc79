use std::ops::{Add, Mul, Neg, Sub};

/// Order of the prime field used for every share computation
pub const PRIME: u16 = 251;

/// Largest canonical field element
pub const MAX_ELEMENT: u8 = (PRIME - 1) as u8;

/// Maps a raw byte onto its canonical residue.
///
/// Byte values 251..=255 have no element of their own and wrap to 0..=4.
/// Reconstruction must apply the same rule.
#[inline]
pub const fn reduce(value: u8) -> u8 {
    (value as u16 % PRIME) as u8
}

/// Prime field (GF(251)) arithmetic implementation
///
/// Holds a canonical residue in `[0, 250]`. Every constructor reduces its
/// input, so arithmetic never sees an out-of-field value.
///
/// # Example
/// ```
/// use shadow_share::FiniteField;
///
/// let a = FiniteField::new(200);
/// let b = FiniteField::new(100);
/// assert_eq!((a + b).value(), 49);
/// assert_eq!((a * b).value(), 171);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FiniteField(u8);

impl FiniteField {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    /// Creates a new field element, reducing the byte into the field
    ///
    /// # Example
    /// ```
    /// use shadow_share::FiniteField;
    ///
    /// assert_eq!(FiniteField::new(250).value(), 250);
    /// assert_eq!(FiniteField::new(253).value(), 2);
    /// ```
    #[inline]
    pub const fn new(value: u8) -> Self {
        Self(reduce(value))
    }

    /// Canonical byte representation in `[0, 250]`
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Replaces zero with one.
    ///
    /// Used wherever a zero would degenerate the scheme: leading
    /// coefficients fed into blinding and evaluation points.
    #[inline]
    pub const fn nonzero_or_one(self) -> Self {
        if self.0 == 0 { Self::ONE } else { self }
    }

    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self(((self.0 as u16 + other.0 as u16) % PRIME) as u8)
    }

    /// Additive inverse
    ///
    /// # Example
    /// ```
    /// use shadow_share::FiniteField;
    ///
    /// let r = FiniteField::new(7);
    /// assert_eq!(r.negate().value(), 244);
    /// assert_eq!(r + r.negate(), FiniteField::ZERO);
    /// ```
    #[inline]
    pub fn negate(self) -> Self {
        Self(((PRIME - self.0 as u16) % PRIME) as u8)
    }

    #[inline]
    pub fn multiply(self, other: Self) -> Self {
        Self(((self.0 as u16 * other.0 as u16) % PRIME) as u8)
    }

    /// Computes exponentiation using square-and-multiply
    ///
    /// # Example
    /// ```
    /// use shadow_share::FiniteField;
    ///
    /// let base = FiniteField::new(3);
    /// assert_eq!(base.exp(3), base * base * base);
    /// ```
    #[inline]
    pub fn exp(self, mut exp: u32) -> Self {
        let mut result = Self::ONE;
        let mut base = self;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.multiply(base);
            }
            base = base.multiply(base);
            exp >>= 1;
        }
        result
    }

    /// Multiplicative inverse via Fermat's Little Theorem: a^(p-2) = a^249
    ///
    /// Returns None for zero (which has no inverse)
    #[inline]
    pub fn inverse(self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self.exp(PRIME as u32 - 2))
        }
    }
}

impl From<u8> for FiniteField {
    #[inline]
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<FiniteField> for u8 {
    #[inline]
    fn from(element: FiniteField) -> Self {
        element.0
    }
}

impl Add for FiniteField {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        FiniteField::add(self, other)
    }
}

impl Sub for FiniteField {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        FiniteField::add(self, other.negate())
    }
}

impl Mul for FiniteField {
    type Output = Self;
    #[inline]
    fn mul(self, other: Self) -> Self {
        self.multiply(other)
    }
}

impl Neg for FiniteField {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.negate()
    }
}
