//! Raw and DER ECDSA signature representations.
//!
//! Platform signing primitives return ECDSA signatures as a fixed-width
//! `r‖s` concatenation, each half exactly the curve order byte length.
//! TLS and X.509 consumers expect the DER `Ecdsa-Sig-Value` form instead
//! (a SEQUENCE of two INTEGERs). The two shapes are kept as distinct types
//! with explicit conversions in both directions. RSA signatures never pass
//! through here.

use std::fmt;

use der::asn1::UintRef;
use der::{Decode, Encode, Sequence};

/// `Ecdsa-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`
#[derive(Sequence)]
struct EcdsaSigValue<'a> {
    r: UintRef<'a>,
    s: UintRef<'a>,
}

/// Fixed-width `r‖s` signature as produced by a signing provider.
///
/// Invariant: the byte length is even and non-zero; each half is one
/// big-endian unsigned integer padded to the curve order byte length.
/// The order length is always derived from the signature itself, so the
/// same code handles P-256, P-384 and any other prime curve.
#[derive(Clone, Eq, PartialEq)]
pub struct RawEcdsaSignature {
    bytes: Box<[u8]>,
}

impl RawEcdsaSignature {
    pub fn new(bytes: Vec<u8>) -> Result<Self, SignatureFormatError> {
        if bytes.is_empty() {
            return Err(SignatureFormatError::Empty);
        }
        if bytes.len() % 2 != 0 {
            return Err(SignatureFormatError::OddLength(bytes.len()));
        }
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Reassemble from the two integer halves, left-padding each to
    /// `order_len` bytes.
    pub fn from_scalars(
        r: &[u8],
        s: &[u8],
        order_len: usize,
    ) -> Result<Self, SignatureFormatError> {
        if order_len == 0 {
            return Err(SignatureFormatError::Empty);
        }
        let mut bytes = vec![0u8; order_len * 2];
        copy_left_padded(&mut bytes[..order_len], r, order_len)?;
        copy_left_padded(&mut bytes[order_len..], s, order_len)?;
        Self::new(bytes)
    }

    /// Curve order byte length, derived as half the raw length.
    #[must_use]
    pub fn order_len(&self) -> usize {
        self.bytes.len() / 2
    }

    /// Big-endian `r` half.
    #[must_use]
    pub fn r(&self) -> &[u8] {
        &self.bytes[..self.order_len()]
    }

    /// Big-endian `s` half.
    #[must_use]
    pub fn s(&self) -> &[u8] {
        &self.bytes[self.order_len()..]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for RawEcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawEcdsaSignature(order_len={})", self.order_len())
    }
}

/// DER-encoded `Ecdsa-Sig-Value`, the on-wire signature form.
#[derive(Clone, Eq, PartialEq)]
pub struct DerEcdsaSignature {
    bytes: Box<[u8]>,
}

impl DerEcdsaSignature {
    /// Encode a raw `r‖s` signature into DER.
    ///
    /// Each half is stripped to its minimal big-endian form; the DER
    /// encoder re-adds a leading zero byte when the high bit is set. The
    /// encoding runs the encoder's length pass first and allocates the
    /// output to exactly that size before filling it.
    pub fn from_raw(raw: &RawEcdsaSignature) -> Result<Self, SignatureFormatError> {
        let value = EcdsaSigValue {
            r: UintRef::new(strip_leading_zeroes(raw.r()))?,
            s: UintRef::new(strip_leading_zeroes(raw.s()))?,
        };

        let required = usize::try_from(value.encoded_len()?)?;
        if required == 0 {
            return Err(SignatureFormatError::EmptyEncoding);
        }
        let mut bytes = vec![0u8; required];
        let written = value.encode_to_slice(&mut bytes)?.len();
        if written != required {
            return Err(SignatureFormatError::EmptyEncoding);
        }

        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Parse DER bytes, verifying they form a well-formed two-integer
    /// sequence.
    pub fn from_der_bytes(bytes: Vec<u8>) -> Result<Self, SignatureFormatError> {
        EcdsaSigValue::from_der(&bytes)?;
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Decode back into the fixed-width `r‖s` form for the given curve
    /// order byte length.
    pub fn to_raw(&self, order_len: usize) -> Result<RawEcdsaSignature, SignatureFormatError> {
        let value = EcdsaSigValue::from_der(&self.bytes)?;
        RawEcdsaSignature::from_scalars(value.r.as_bytes(), value.s.as_bytes(), order_len)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes.into()
    }

    /// Largest possible encoding for a curve with the given order byte
    /// length. Callers sizing their own output buffers should use this.
    #[must_use]
    pub fn max_encoded_len(order_len: usize) -> usize {
        // INTEGER: tag + length + value with a possible sign byte.
        let int_tlv = 2 + order_len + 1;
        let content = 2 * int_tlv;
        let seq_header = if content < 128 { 2 } else { 3 };
        seq_header + content
    }
}

impl fmt::Debug for DerEcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerEcdsaSignature(len={})", self.bytes.len())
    }
}

fn strip_leading_zeroes(mut bytes: &[u8]) -> &[u8] {
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes = &bytes[1..];
    }
    bytes
}

fn copy_left_padded(
    dest: &mut [u8],
    src: &[u8],
    order_len: usize,
) -> Result<(), SignatureFormatError> {
    let src = strip_leading_zeroes(src);
    if src.len() > order_len {
        return Err(SignatureFormatError::OversizedScalar {
            len: src.len(),
            order_len,
        });
    }
    dest[order_len - src.len()..].copy_from_slice(src);
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureFormatError {
    #[error("signature value is empty")]
    Empty,

    #[error("raw signature length {0} cannot be split into two equal halves")]
    OddLength(usize),

    #[error("integer component of {len} bytes exceeds curve order length {order_len}")]
    OversizedScalar { len: usize, order_len: usize },

    #[error("encoder produced an empty signature")]
    EmptyEncoding,

    #[error("ASN.1 error: {0}")]
    Asn1(#[from] der::Error),
}
