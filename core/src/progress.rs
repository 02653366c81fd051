use indicatif::{ProgressBar, ProgressStyle};

/// Bar shown while a source folder is being sorted.
pub fn sort_style() -> ProgressStyle {
    match ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.green/white} {pos}/{len} files {msg}")
    {
        Ok(style) => style.progress_chars("=>-"),
        Err(_) => ProgressStyle::default_bar(),
    }
}

/// A bar with [`sort_style`] whose length is set once the folder is listed.
pub fn sort_bar() -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(sort_style());
    progress_bar
}
