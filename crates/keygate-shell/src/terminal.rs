//! Line-oriented terminal surfaces.

use std::io::{self, BufRead, Write};

use keygate_core::gate::{Surface, SurfaceWindow};

/// A "window" drawn as a banner on stdout.
pub struct TerminalWindow {
    surface: Surface,
}

impl SurfaceWindow for TerminalWindow {
    fn open(surface: Surface) -> Self {
        println!();
        println!("=== {} ===", surface.title());
        Self { surface }
    }

    fn close(self) {
        println!("[{} closed]", self.surface.title());
    }
}

/// Print `label` and read one trimmed line. `None` on end of input.
pub fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
