use colored::*;
use tandem::client::{RemoteTrack, Viewport};

/// Prints what a real UI would render.
pub struct ConsoleViewport {
    name: String,
}

impl ConsoleViewport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    fn prefix(&self) -> ColoredString {
        format!("[{}]", self.name).bold()
    }
}

impl Viewport for ConsoleViewport {
    fn show_local(&mut self, stream_id: &str) {
        println!("{} 🎥 local stream {}", self.prefix(), stream_id.dimmed());
    }

    fn show_remote(&mut self, track: &RemoteTrack) {
        println!(
            "{} 📺 remote {} track {} ({})",
            self.prefix(),
            track.kind,
            track.track_id.cyan(),
            track.stream_id.dimmed()
        );
    }

    fn clear(&mut self) {
        println!("{} viewport cleared", self.prefix());
    }
}
