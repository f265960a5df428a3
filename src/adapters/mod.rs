//! Adapter layer for external key-store integration.
//!
//! The signing pipeline talks to certificate stores only through the
//! [`store::CertStoreProvider`] trait, so a platform store, a hardware
//! token, or the in-process software store can all back the same pipeline.

pub mod store;
