//! Symbol module - String interning for efficient identifier handling.
//!
//! This module provides the [`Symbol`] type, which is a compact (4-byte) handle
//! to an interned string. Symbols enable O(1) string comparison and reduce memory
//! usage when the same identifier appears many times across a program's types,
//! entities, behaviors, and scenarios.
//!
//! # Overview
//!
//! The symbol interning system is a core component of the checker, providing:
//!
//! - **Memory efficiency**: Each unique string is stored only once
//! - **Fast comparison**: Symbol comparison is O(1) via index comparison
//! - **Thread safety**: Safe to use across multiple threads concurrently
//! - **Stable handles**: Symbols remain valid for the program lifetime
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `Symbol::intern()` (hit) | O(1) | String already interned |
//! | `Symbol::intern()` (miss) | O(1) | New string allocation |
//! | `Symbol` comparison | O(1) | Index comparison only |
//! | `Symbol::as_str()` | O(n) | Linear search by index |
//! | `Symbol::eq_str()` | O(1) | Hash + pointer comparison |
//!
//! # Thread Safety
//!
//! The symbol interner is fully thread-safe (`Sync + Send`). Multiple threads
//! can intern strings concurrently without blocking each other, thanks to
//! DashMap's lock-free design.
//!
//! # Memory Model
//!
//! Interned strings are allocated on the heap with `'static` lifetime.
//! They are never deallocated, which is acceptable because:
//! 1. A single checking/verification run has a finite duration
//! 2. Total memory usage is bounded by program source size
//! 3. This avoids complex lifetime tracking
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```
//! use covenant_util::symbol::Symbol;
//!
//! let s1 = Symbol::intern("Order");
//! let s2 = Symbol::intern("Order");
//! let s3 = Symbol::intern("Customer");
//!
//! assert_eq!(s1, s2);  // Same symbol for same string
//! assert_ne!(s1, s3);  // Different strings get different symbols
//! ```
//!
//! Using known vocabulary:
//!
//! ```
//! use covenant_util::symbol::{Symbol, KW_ENTITY, TY_DECIMAL};
//!
//! assert_eq!(KW_ENTITY.as_str(), "entity");
//! assert_eq!(TY_DECIMAL.as_str(), "Decimal");
//! assert!(KW_ENTITY.is_known());  // Pre-defined vocabulary
//! ```
//!
//! Thread-safe usage:
//!
//! ```
//! use covenant_util::symbol::Symbol;
//! use std::thread;
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         thread::spawn(move || {
//!             Symbol::intern(&format!("thread_{}", i))
//!         })
//!     })
//!     .collect();
//!
//! let symbols: Vec<_> = handles.into_iter()
//!     .map(|h| h.join().unwrap())
//!     .collect();
//!
//! // All symbols are unique
//! assert_eq!(symbols.len(), 4);
//! ```
//!
//! # Statistics and Profiling
//!
//! The interner tracks hit/miss statistics for performance profiling:
//!
//! ```
//! use covenant_util::symbol::Symbol;
//!
//! let _ = Symbol::intern("test");
//! let _ = Symbol::intern("test");  // Hit
//!
//! let stats = Symbol::stats_struct();
//! println!("Hits: {}, Misses: {}", stats.hits, stats.misses);
//! ```

mod interner;

pub use interner::STRING_TABLE;

/// Statistics about the string interner for profiling
///
/// Provides insights into memory usage and efficiency of the interner.
///
/// # Fields
///
/// * `count` - Number of unique interned strings
/// * `capacity` - Hash map capacity (number of buckets)
/// * `collisions` - Number of hash collisions encountered
/// * `hits` - Number of times an already-interned string was requested
/// * `misses` - Number of times a new string was allocated
///
/// # Examples
///
/// ```
/// use covenant_util::symbol::{Symbol, InternerStats};
///
/// let stats = Symbol::stats_struct();
/// println!("Interned {} strings", stats.count);
/// println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
/// println!("Load factor: {:.2}", stats.load_factor());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct InternerStats {
    /// Number of interned strings
    pub count: usize,
    /// Hash map capacity (number of buckets)
    pub capacity: usize,
    /// Number of hash collisions encountered
    pub collisions: usize,
    /// Number of cache hits (string already interned)
    pub hits: usize,
    /// Number of cache misses (new string allocation)
    pub misses: usize,
}

impl InternerStats {
    /// Create new stats with the given values
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 256, 5, 80, 20);
    /// assert_eq!(stats.count, 100);
    /// assert_eq!(stats.hits, 80);
    /// ```
    pub const fn new(
        count: usize,
        capacity: usize,
        collisions: usize,
        hits: usize,
        misses: usize,
    ) -> Self {
        Self {
            count,
            capacity,
            collisions,
            hits,
            misses,
        }
    }

    /// Calculate the load factor (count / capacity)
    ///
    /// Returns 0.0 if capacity is 0.
    ///
    /// A load factor above 0.75 indicates the hash map may need resizing.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 0, 0);
    /// assert_eq!(stats.load_factor(), 0.5);
    /// ```
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.count as f64 / self.capacity as f64
        }
    }

    /// Check if the interner is getting full (load factor > 0.75)
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 0, 0);
    /// assert!(!stats.is_near_capacity());
    ///
    /// let stats = InternerStats::new(100, 120, 0, 0, 0);
    /// assert!(stats.is_near_capacity());
    /// ```
    pub fn is_near_capacity(&self) -> bool {
        self.load_factor() > 0.75
    }

    /// Calculate the hit rate (hits / (hits + misses))
    ///
    /// Returns 0.0 if no lookups have been performed.
    ///
    /// A high hit rate (>0.9) indicates good interning efficiency.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 90, 10);
    /// assert_eq!(stats.hit_rate(), 0.9);
    /// ```
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Get total number of interning operations
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(100, 200, 0, 90, 10);
    /// assert_eq!(stats.total_operations(), 100);
    /// ```
    pub fn total_operations(&self) -> usize {
        self.hits + self.misses
    }

    /// Get memory efficiency ratio (unique strings / total operations)
    ///
    /// Lower values indicate better deduplication.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::InternerStats;
    ///
    /// let stats = InternerStats::new(10, 100, 0, 90, 10);
    /// assert_eq!(stats.memory_efficiency(), 0.1);  // 10 unique / 100 ops
    /// ```
    pub fn memory_efficiency(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.count as f64 / self.total_operations() as f64
        }
    }
}

/// Symbol - An interned string identifier
///
/// A Symbol is a compact (4-byte) handle to a string stored in a global
/// string table. This enables O(1) string comparison and reduces memory
/// usage when the same string appears multiple times.
///
/// # Size
///
/// `Symbol` is exactly 4 bytes (u32), making it very cache-friendly compared
/// to `String` which is 24 bytes plus heap allocation.
///
/// # Thread Safety
///
/// Symbols are safe to share across threads (`Sync + Send`). The underlying
/// string table uses DashMap for lock-free concurrent access.
///
/// # Lifetime
///
/// Interned strings have `'static` lifetime and are never deallocated.
/// This is safe because the string table lives for the program duration.
///
/// # Examples
///
/// ```
/// use covenant_util::symbol::Symbol;
///
/// let type_name = Symbol::intern("Order");
/// let field_name = Symbol::intern("total");
///
/// assert_eq!(type_name.as_str(), "Order");
/// assert_eq!(field_name.as_str(), "total");
/// assert_eq!(type_name, Symbol::intern("Order"));  // O(1) comparison
/// ```
///
/// # Performance Notes
///
/// - **Creation**: O(1) hash lookup/insert
/// - **Comparison**: O(1) index comparison
/// - **String retrieval**: O(n) linear search (avoid in hot paths)
/// - **Memory**: One allocation per unique string
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    /// Index into the global string table
    pub(crate) index: u32,
}

// ============================================================================
// KNOWN SYMBOLS (DECLARATION KEYWORDS, BUILT-IN TYPES, STDLIB FUNCTIONS)
// ============================================================================
//
/// Reserved symbol indices for known symbols (keywords, built-in types,
/// stdlib functions, pseudo-identifiers)
///
/// All symbols with index < this value are pre-defined at startup and
/// correspond to vocabulary fixed by the data model: declaration keywords,
/// primitive type names, and the handful of built-in free functions.
const RESERVED_SYMBOLS_END: u32 = 512;

// ----------------------------------------------------------------------------
// Declaration Keywords
// ----------------------------------------------------------------------------

/// Known symbol for the `type` keyword (value type declaration)
pub const KW_TYPE: Symbol = Symbol { index: 0 };
/// Known symbol for the `entity` keyword
pub const KW_ENTITY: Symbol = Symbol { index: 1 };
/// Known symbol for the `behavior` keyword
pub const KW_BEHAVIOR: Symbol = Symbol { index: 2 };
/// Known symbol for the `lifecycle` keyword
pub const KW_LIFECYCLE: Symbol = Symbol { index: 3 };
/// Known symbol for the `scenario` keyword
pub const KW_SCENARIO: Symbol = Symbol { index: 4 };
/// Known symbol for the `enum` keyword
pub const KW_ENUM: Symbol = Symbol { index: 5 };

// ----------------------------------------------------------------------------
// Structural Keywords
// ----------------------------------------------------------------------------

/// Known symbol for the `state` keyword
pub const KW_STATE: Symbol = Symbol { index: 6 };
/// Known symbol for the `states` keyword
pub const KW_STATES: Symbol = Symbol { index: 7 };
/// Known symbol for the `requires` keyword (precondition)
pub const KW_REQUIRES: Symbol = Symbol { index: 8 };
/// Known symbol for the `ensures` keyword (postcondition)
pub const KW_ENSURES: Symbol = Symbol { index: 9 };
/// Known symbol for the `invariant` keyword
pub const KW_INVARIANT: Symbol = Symbol { index: 10 };
/// Known symbol for the `given` keyword (scenario setup)
pub const KW_GIVEN: Symbol = Symbol { index: 11 };
/// Known symbol for the `when` keyword (scenario action)
pub const KW_WHEN: Symbol = Symbol { index: 12 };
/// Known symbol for the `then` keyword (scenario assertion)
pub const KW_THEN: Symbol = Symbol { index: 13 };

// ----------------------------------------------------------------------------
// Literals
// ----------------------------------------------------------------------------

/// Known symbol for the `true` literal
pub const KW_TRUE: Symbol = Symbol { index: 14 };
/// Known symbol for the `false` literal
pub const KW_FALSE: Symbol = Symbol { index: 15 };

// ----------------------------------------------------------------------------
// Logical and Relational Operators (word-form)
// ----------------------------------------------------------------------------

/// Known symbol for the `and` operator
pub const OP_AND: Symbol = Symbol { index: 16 };
/// Known symbol for the `or` operator
pub const OP_OR: Symbol = Symbol { index: 17 };
/// Known symbol for the `not` operator
pub const OP_NOT: Symbol = Symbol { index: 18 };
/// Known symbol for the `implies` operator
pub const OP_IMPLIES: Symbol = Symbol { index: 19 };
/// Known symbol for the `iff` operator
pub const OP_IFF: Symbol = Symbol { index: 20 };
/// Known symbol for the `in` operator (collection membership)
pub const OP_IN: Symbol = Symbol { index: 21 };

// ----------------------------------------------------------------------------
// Quantifier Functions
// ----------------------------------------------------------------------------

/// Known symbol for the `all` quantifier
pub const FN_ALL: Symbol = Symbol { index: 22 };
/// Known symbol for the `any` quantifier
pub const FN_ANY: Symbol = Symbol { index: 23 };
/// Known symbol for the `none` quantifier
pub const FN_NONE: Symbol = Symbol { index: 24 };
/// Known symbol for the `count` quantifier
pub const FN_COUNT: Symbol = Symbol { index: 25 };
/// Known symbol for the `sum` quantifier
pub const FN_SUM: Symbol = Symbol { index: 26 };
/// Known symbol for the `filter` quantifier
pub const FN_FILTER: Symbol = Symbol { index: 27 };

// ----------------------------------------------------------------------------
// Pseudo-Identifiers
// ----------------------------------------------------------------------------

/// Known symbol for `result`, bound to the return value inside a postcondition
pub const ID_RESULT: Symbol = Symbol { index: 28 };
/// Known symbol for `old`, the pre-state snapshot function
pub const ID_OLD: Symbol = Symbol { index: 29 };
/// Known symbol for `input`, the bindings passed into a behavior
pub const ID_INPUT: Symbol = Symbol { index: 30 };
/// Known symbol for `output`, the bindings produced by a behavior
pub const ID_OUTPUT: Symbol = Symbol { index: 31 };

// ----------------------------------------------------------------------------
// Primitive Type Names
// ----------------------------------------------------------------------------

/// Known symbol for the `String` type
pub const TY_STRING: Symbol = Symbol { index: 32 };
/// Known symbol for the `Int` type
pub const TY_INT: Symbol = Symbol { index: 33 };
/// Known symbol for the `Decimal` type
pub const TY_DECIMAL: Symbol = Symbol { index: 34 };
/// Known symbol for the `Boolean` type
pub const TY_BOOLEAN: Symbol = Symbol { index: 35 };
/// Known symbol for the `Timestamp` type
pub const TY_TIMESTAMP: Symbol = Symbol { index: 36 };
/// Known symbol for the `UUID` type
pub const TY_UUID: Symbol = Symbol { index: 37 };
/// Known symbol for the `Duration` type
pub const TY_DURATION: Symbol = Symbol { index: 38 };
/// Known symbol for the `List` type constructor
pub const TY_LIST: Symbol = Symbol { index: 39 };
/// Known symbol for the `Map` type constructor
pub const TY_MAP: Symbol = Symbol { index: 40 };
/// Known symbol for the `Optional` type constructor
pub const TY_OPTIONAL: Symbol = Symbol { index: 41 };
/// Known symbol for the built-in `Status` enum
pub const TY_STATUS: Symbol = Symbol { index: 42 };

// ----------------------------------------------------------------------------
// Built-in Stdlib Functions
// ----------------------------------------------------------------------------

/// Known symbol for the `now` built-in function
pub const FN_NOW: Symbol = Symbol { index: 43 };
/// Known symbol for the `uuid` built-in function
pub const FN_UUID: Symbol = Symbol { index: 44 };
/// Known symbol for the `today` built-in function
pub const FN_TODAY: Symbol = Symbol { index: 45 };
/// Known symbol for the `hash` built-in function
pub const FN_HASH: Symbol = Symbol { index: 46 };
/// Known symbol for the `random` built-in function
pub const FN_RANDOM: Symbol = Symbol { index: 47 };

// ----------------------------------------------------------------------------
// Common Field and Identifier Names
// ----------------------------------------------------------------------------

/// Known symbol for `id`
pub const ID_ID: Symbol = Symbol { index: 48 };
/// Known symbol for `name`
pub const ID_NAME: Symbol = Symbol { index: 49 };
/// Known symbol for `value`
pub const ID_VALUE: Symbol = Symbol { index: 50 };
/// Known symbol for `status`
pub const ID_STATUS: Symbol = Symbol { index: 51 };

impl Symbol {
    /// The maximum index value for a symbol
    pub const MAX_INDEX: u32 = u32::MAX;

    /// Intern a string, returning its symbol
    ///
    /// This function will:
    /// 1. Hash the string to check for existing entry
    /// 2. If found, return existing symbol (cache hit)
    /// 3. If not found, allocate new slot and return new symbol (cache miss)
    ///
    /// # Thread Safety
    ///
    /// This function is thread-safe. Multiple threads can intern strings
    /// concurrently using DashMap for lock-free access.
    ///
    /// # Performance
    ///
    /// - **Best case** (string already interned): O(1) hash lookup
    /// - **Worst case** (new unique string): O(1) hash insert + allocation
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let type_name = Symbol::intern("Order");
    /// let field_name = Symbol::intern("total");
    ///
    /// // Interning the same string returns the same symbol
    /// assert_eq!(Symbol::intern("Order"), type_name);
    /// ```
    #[inline]
    pub fn intern(string: &str) -> Self {
        STRING_TABLE.intern(string)
    }

    /// Get the string value associated with this symbol
    ///
    /// # Performance
    ///
    /// O(n) where n is the number of interned strings, as we need to
    /// search the DashMap by index. This is a trade-off for better
    /// concurrent write performance.
    ///
    /// For hot paths, consider caching the string reference or using
    /// [`Symbol::eq_str()`] for comparisons.
    ///
    /// # Panics
    ///
    /// Returns empty string if the symbol is invalid (e.g., created manually
    /// with an out-of-bounds index).
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert_eq!(sym.as_str(), "hello");
    /// ```
    #[inline]
    pub fn as_str(&self) -> &'static str {
        STRING_TABLE.get(*self).unwrap_or("")
    }

    /// Check if the symbol's string is empty
    ///
    /// # Performance
    ///
    /// O(1) - checks if index corresponds to the empty string symbol.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// assert!(Symbol::intern("").is_empty());
    /// assert!(!Symbol::intern("hello").is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Get the length of the symbol's string in bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// assert_eq!(Symbol::intern("hello").len(), 5);
    /// assert_eq!(Symbol::intern("").len(), 0);
    /// assert_eq!(Symbol::intern("你好").len(), 6);  // UTF-8 bytes
    /// ```
    #[inline]
    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    /// Check if the symbol's string starts with a given prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello_world");
    /// assert!(sym.starts_with("hello"));
    /// assert!(!sym.starts_with("world"));
    /// ```
    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.as_str().starts_with(prefix)
    }

    /// Check if the symbol's string ends with a given suffix
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello_world");
    /// assert!(sym.ends_with("world"));
    /// assert!(!sym.ends_with("hello"));
    /// ```
    #[inline]
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.as_str().ends_with(suffix)
    }

    /// Compare the symbol's string with a `&str` without allocation
    ///
    /// This is more efficient than `symbol.as_str() == other` when you
    /// only need equality comparison, as it can short-circuit early.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert!(sym.eq_str("hello"));
    /// assert!(!sym.eq_str("world"));
    /// ```
    #[inline]
    pub fn eq_str(&self, other: &str) -> bool {
        self.as_str() == other
    }

    /// Returns true if this is a "known" symbol (predefined vocabulary)
    ///
    /// Known symbols are interned at startup and have indices in a reserved
    /// range (0 to `RESERVED_SYMBOLS_END`).
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::{Symbol, KW_ENTITY};
    ///
    /// assert!(KW_ENTITY.is_known());
    /// assert!(!Symbol::intern("my_custom_type").is_known());
    /// ```
    #[inline]
    pub fn is_known(&self) -> bool {
        self.index < RESERVED_SYMBOLS_END
    }

    /// Get the raw index value
    ///
    /// Useful for serialization or debugging.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("test");
    /// let index = sym.as_u32();
    /// ```
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.index
    }

    /// Create a symbol from a raw index
    ///
    /// # Safety
    ///
    /// The index must correspond to a valid entry in the string table.
    /// Creating a symbol with an invalid index leads to undefined behavior
    /// when calling `as_str()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("test");
    /// let index = sym.as_u32();
    /// let sym2 = unsafe { Symbol::from_u32_unchecked(index) };
    /// assert_eq!(sym, sym2);
    /// ```
    #[inline]
    pub unsafe fn from_u32_unchecked(index: u32) -> Self {
        Self { index }
    }

    /// Get statistics about the string interner for profiling
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let stats = Symbol::stats_struct();
    /// println!("Interned {} strings", stats.count);
    /// println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
    /// ```
    #[inline]
    pub fn stats_struct() -> InternerStats {
        STRING_TABLE.stats()
    }

    /// Get basic statistics about the string interner (legacy API)
    ///
    /// Returns a tuple of (number of interned strings, hash map capacity).
    /// For more detailed statistics, use [`Symbol::stats_struct`].
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let (count, capacity) = Symbol::stats();
    /// println!("Interned {} strings with capacity {}", count, capacity);
    /// ```
    #[inline]
    pub fn stats() -> (usize, usize) {
        let stats = STRING_TABLE.stats();
        (stats.count, stats.capacity)
    }

    /// Intern a known vocabulary word, returning its predefined symbol
    ///
    /// This is a convenience method for interning declaration keywords,
    /// operators, quantifiers, pseudo-identifiers, and primitive type
    /// names. For known words, this returns the predefined constant symbol
    /// without hashing or allocation.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::{Symbol, KW_ENTITY};
    ///
    /// let sym = Symbol::intern_known("entity");
    /// assert_eq!(sym, KW_ENTITY);
    ///
    /// // Unknown words are interned normally
    /// let unknown = Symbol::intern_known("Order");
    /// assert!(!unknown.is_known());
    /// ```
    #[inline]
    pub fn intern_known(string: &str) -> Self {
        match string {
            // Declaration keywords
            "type" => KW_TYPE,
            "entity" => KW_ENTITY,
            "behavior" => KW_BEHAVIOR,
            "lifecycle" => KW_LIFECYCLE,
            "scenario" => KW_SCENARIO,
            "enum" => KW_ENUM,
            // Structural keywords
            "state" => KW_STATE,
            "states" => KW_STATES,
            "requires" => KW_REQUIRES,
            "ensures" => KW_ENSURES,
            "invariant" => KW_INVARIANT,
            "given" => KW_GIVEN,
            "when" => KW_WHEN,
            "then" => KW_THEN,
            // Literals
            "true" => KW_TRUE,
            "false" => KW_FALSE,
            // Logical operators
            "and" => OP_AND,
            "or" => OP_OR,
            "not" => OP_NOT,
            "implies" => OP_IMPLIES,
            "iff" => OP_IFF,
            "in" => OP_IN,
            // Quantifiers
            "all" => FN_ALL,
            "any" => FN_ANY,
            "none" => FN_NONE,
            "count" => FN_COUNT,
            "sum" => FN_SUM,
            "filter" => FN_FILTER,
            // Pseudo-identifiers
            "result" => ID_RESULT,
            "old" => ID_OLD,
            "input" => ID_INPUT,
            "output" => ID_OUTPUT,
            // Primitive types
            "String" => TY_STRING,
            "Int" => TY_INT,
            "Decimal" => TY_DECIMAL,
            "Boolean" => TY_BOOLEAN,
            "Timestamp" => TY_TIMESTAMP,
            "UUID" => TY_UUID,
            "Duration" => TY_DURATION,
            "List" => TY_LIST,
            "Map" => TY_MAP,
            "Optional" => TY_OPTIONAL,
            "Status" => TY_STATUS,
            // Built-in stdlib functions
            "now" => FN_NOW,
            "uuid" => FN_UUID,
            "today" => FN_TODAY,
            "hash" => FN_HASH,
            "random" => FN_RANDOM,
            // Common field names
            "id" => ID_ID,
            "name" => ID_NAME,
            "value" => ID_VALUE,
            "status" => ID_STATUS,
            _ => Self::intern(string),
        }
    }

    /// Get the symbol for a primitive type name
    ///
    /// Returns the predefined symbol for primitive and built-in type names,
    /// or interns the string for user-declared types.
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::{Symbol, TY_INT, TY_STRING};
    ///
    /// assert_eq!(Symbol::intern_type("Int"), TY_INT);
    /// assert_eq!(Symbol::intern_type("String"), TY_STRING);
    /// ```
    #[inline]
    pub fn intern_type(string: &str) -> Self {
        match string {
            "String" => TY_STRING,
            "Int" => TY_INT,
            "Decimal" => TY_DECIMAL,
            "Boolean" => TY_BOOLEAN,
            "Timestamp" => TY_TIMESTAMP,
            "UUID" => TY_UUID,
            "Duration" => TY_DURATION,
            "List" => TY_LIST,
            "Map" => TY_MAP,
            "Optional" => TY_OPTIONAL,
            "Status" => TY_STATUS,
            _ => Self::intern(string),
        }
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

impl std::fmt::Debug for Symbol {
    /// Format the symbol for debugging, showing the actual string content
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert_eq!(format!("{:?}", sym), "Symbol(hello)");
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    /// Format the symbol for display, showing just the string content
    ///
    /// # Examples
    ///
    /// ```
    /// use covenant_util::symbol::Symbol;
    ///
    /// let sym = Symbol::intern("hello");
    /// assert_eq!(format!("{}", sym), "hello");
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pretty-print a symbol with quotes for debugging
///
/// # Examples
///
/// ```
/// use covenant_util::symbol::{Symbol, SymbolPretty};
///
/// let sym = Symbol::intern("hello");
/// assert_eq!(format!("{}", sym.pretty()), "\"hello\"");
/// ```
pub trait SymbolPretty {
    /// Get a pretty-printed version with quotes
    fn pretty(&self) -> SymbolPrettyDisplay<'_>;
}

impl SymbolPretty for Symbol {
    fn pretty(&self) -> SymbolPrettyDisplay<'_> {
        SymbolPrettyDisplay(self)
    }
}

/// Display wrapper for pretty-printing symbols with quotes
pub struct SymbolPrettyDisplay<'a>(&'a Symbol);

impl std::fmt::Display for SymbolPrettyDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", self.0.as_str())
    }
}

impl std::fmt::Debug for SymbolPrettyDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymbolPretty(\"{}\")", self.0.as_str())
    }
}

// Ensure Symbol is thread-safe
static_assertions::assert_impl_all!(Symbol: Send, Sync);
