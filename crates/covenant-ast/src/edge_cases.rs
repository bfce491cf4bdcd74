//! Edge case tests for AST node construction.
//!
//! These exercise boundary shapes the domain checker must handle once
//! it walks a [`Domain`]: an empty domain, self-referential type chains,
//! deeply nested quantifiers, and optional chains through entity fields.
//! There is no parser here, so every case is built directly via the AST
//! node constructors.
