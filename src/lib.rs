#![forbid(unsafe_code)]
//! # aztecrust
//!
//! A Rust library for generating Aztec 2D barcodes.
//!
//! `aztecrust` encodes text or binary data into Aztec symbols as described in
//! ISO/IEC 24778. It picks the shortest mix of the five Aztec character modes,
//! chooses the smallest compact (1 to 4 layers) or full-range (1 to 32 layers)
//! symbol that holds the data plus the requested error correction, and renders
//! the result to the console, PNG, SVG or in-memory image buffers.
//!
//! ## Features
//!
//! - Optimal high-level encoding across UPPER, LOWER, DIGIT, MIXED and PUNCT
//!   modes, with binary shift for everything else.
//! - Reed-Solomon error correction over GF(16) to GF(4096).
//! - ECI designators for ISO-8859-1 and UTF-8 text.
//! - Render symbols as ASCII art, PNG images, SVGs, or in-memory image buffers.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! aztecrust = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Encode bytes with the default error correction and let the encoder pick
//! the size:
//!
//! ```rust
//! use aztecrust::{encode, DEFAULT_AZTEC_LAYERS, DEFAULT_EC_PERCENT};
//!
//! let code = encode(b"Hello, World!", DEFAULT_EC_PERCENT, DEFAULT_AZTEC_LAYERS).unwrap();
//! println!("{}", code.matrix());
//! ```
//!
//! Force a two-layer compact symbol for UTF-8 text and render it:
//!
//! ```rust
//! use aztecrust::{AztecCode, AztecOptions, Charset};
//! use aztecrust::helper::render_image;
//!
//! let options = AztecOptions::default().with_layers(-2).with_charset(Charset::Utf8);
//! let code = AztecCode::encode_text("Grüße", &options).unwrap();
//! let img = render_image(&code, 200, 200, 2);
//! assert_eq!(img.dimensions(), (200, 200));
//! ```
//!
//! ## Modules
//!
//! - [`aztec`]: Symbol sizing, error correction and module placement.
//! - [`highlevel`]: Mode-optimal encoding of bytes into a bit stream.
//! - [`helper`]: Utilities for rendering symbols in various formats.

pub mod aztec;
pub mod bits;
pub mod error;
pub mod helper;
pub mod highlevel;
pub mod reedsolomon;
pub mod state;
pub mod tables;
pub mod token;

pub use aztec::{encode, AztecCode, AztecOptions, Charset, DEFAULT_AZTEC_LAYERS, DEFAULT_EC_PERCENT};
pub use bits::{BitBuffer, BitMatrix};
pub use error::AztecError;
