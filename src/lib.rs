//! Exacta is an exact calculator over the rationals and prime fields.
//!
//! It offers arbitrary-precision natural numbers, integers and rationals,
//! residues modulo a prime, and matrices over either field with row
//! reduction, rank and determinants. A small prefix-notation command
//! language drives all of it from an interactive session.
//!
//! For example:
//!
//! ```
//! use exacta::{domains::rational::Rational, tensors::matrix::Matrix};
//!
//! fn main() {
//!     let entries: Vec<Rational> = ["2", "1", "1", "3"]
//!         .iter()
//!         .map(|e| e.parse::<Rational>().unwrap())
//!         .collect();
//!     let m = Matrix::from_linear(entries, 2, 2).unwrap();
//!
//!     let (rref, rank, det) = m.rref().unwrap();
//!     assert_eq!(rank, 2);
//!     assert_eq!(det.to_string(), "5");
//!     println!("{}", rref);
//! }
//! ```

pub mod domains;
pub mod error;
pub mod evaluate;
pub mod parser;
pub mod printer;
pub mod session;
pub mod state;
pub mod tensors;
