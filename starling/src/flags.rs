use std::path::PathBuf;

xflags::xflags! {
    /// Convert a Jekyll content tree into a Zola content tree.
    cmd starling {
        /// Path to the Jekyll site root.
        required source: PathBuf
        /// Path to the Zola site root.
        required dest: PathBuf

        /// Comma-separated front matter keys treated as taxonomies
        /// (default: tags,categories).
        optional --taxonomies keys: String
        /// Comma-separated front matter keys kept at the root in addition
        /// to the recognized ones.
        optional --extra-root-keys keys: String
        /// IANA timezone for interpreting front matter dates (default:
        /// system-local).
        optional --timezone name: String
        /// Derive URL aliases from dated file names.
        optional --aliases
        /// Report what would be written without touching the filesystem.
        optional --dry-run
        /// Log at debug level.
        optional -v, --verbose
        /// Only log warnings and errors; wins over --verbose.
        optional -q, --quiet
    }
}
