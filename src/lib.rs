//! # retenciones
//!
//! SENIAT withholding declarations for Venezuelan withholding agents:
//! turns IVA and ISLR retention records into the TXT and XML files the tax
//! authority accepts, after validating them against the fiscal rules and
//! numbering their vouchers (comprobantes) sequentially.
//!
//! All monetary values use [`rust_decimal::Decimal`] and are written with
//! exactly two decimals and a literal `.`.
//!
//! ## Quick Start
//!
//! ```rust
//! use retenciones::core::*;
//! use rust_decimal_macros::dec;
//!
//! let agent = AgentConfigurationBuilder::new("J-12345678-9", "Empresa Demo C.A.", "20250800000001")
//!     .build();
//! let tx = RetentionTransactionBuilder::new(TaxType::Iva, "FAC-0001", "2025-01-15", "J-98765432-1")
//!     .control_number("00-00000001")
//!     .amounts(dec!(116000), dec!(100000))
//!     .percentage(dec!(75))
//!     .computed_retention()
//!     .build();
//!
//! assert!(validate_transactions(&[tx.clone()]).valid);
//!
//! let mut seq = VoucherSequence::new(&agent.initial_voucher_number, agent.voucher_counter).unwrap();
//! assert_eq!(seq.next_number().unwrap(), "20250800000001");
//! assert_eq!(format_amount(tx.retention_amount), "12000.00");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Types, formatting, validation, voucher numbering |
//! | `txt` | SENIAT TXT renderer |
//! | `xml` | SENIAT XML renderer |
//! | `engine` | Async export orchestration and store contracts |
//! | `all` (default) | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "txt")]
pub mod txt;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "engine")]
pub mod engine;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
