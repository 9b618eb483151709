//! List theme presets.

use trellis_compiler::ThemeCache;

/// Run the themes command.
pub fn run(themes: &ThemeCache) {
    for name in themes.available_themes() {
        println!("{}", name);
    }
}
