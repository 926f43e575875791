//! A library for converting Jekyll content trees to Zola.
//!
//! # Overview
//!
//! molt rewrites Jekyll markdown posts into their Zola equivalents: YAML
//! front matter between `---` delimiters becomes TOML front matter between
//! `+++` delimiters, Liquid `highlight` blocks become fenced code blocks,
//! and date-prefixed file names under `_posts`-style directories become a
//! clean `content/` tree.
//!
//! Each file moves through a four-stage pipeline:
//!
//! 1. [`Document::load`] reads the source file.
//! 2. [`Document::extract_matter`] slices the metadata block out of the
//!    document ([`frontmatter`]).
//! 3. [`Document::transform`] rewrites the block into the shape Zola
//!    expects and serializes it as TOML ([`remap`]).
//! 4. [`Document::save`] normalizes the body ([`body`]), derives the output
//!    location ([`paths`]), and writes the result through the destination
//!    root ([`DestRoot`]).
//!
//! [`convert_site`] fans the pipeline out over every discovered file
//! ([`walk`]) on the ambient rayon pool, isolating failures per file and
//! tallying a [`Summary`]. Workers share nothing but the read-only
//! [`Context`] and [`RuleSet`].

pub mod error;
pub mod frontmatter;
pub mod body;
pub mod remap;
pub mod paths;
pub mod walk;
pub mod context;
pub mod convert;

pub use context::{Context, DestRoot, RuleSet, Zone};
pub use convert::{convert, convert_site, Document, JekyllDocument, Summary};
pub use error::{Error, Result};

pub use rayon;
