/// Defaults used by the resolver when the caller does not override them.
pub const DEFAULT_BEAM_WIDTH: usize = 1000;
pub const DEFAULT_COUNT: usize = 3;

/// Process wide options such as where the package database snapshot lives.
pub struct AdviserOptions {
	data_dir: std::path::PathBuf,
	beam_width: usize,
	count: usize,
}

impl Default for AdviserOptions {
	fn default() -> Self {
		Self {
			data_dir: {
				#[cfg(target_os = "windows")]
				let path = std::path::PathBuf::from(std::env::var("APPDATA").expect("APPDATA missing."));

				#[cfg(not(target_os = "windows"))]
				let path = if let Ok(e) = std::env::var("XDG_DATA_HOME") {
					std::path::PathBuf::from(e)
				} else {
					std::path::PathBuf::from(std::env::var("HOME").expect("HOME environment variable not set.")).join(".local/share")
				};

				path.join("adviser-rs")
			},
			beam_width: DEFAULT_BEAM_WIDTH,
			count: DEFAULT_COUNT,
		}
	}
}

impl AdviserOptions {
	pub fn data_dir(&self) -> &std::path::PathBuf {
		&self.data_dir
	}
	/// returns if the directory is valid or not.
	pub fn set_data_dir(&mut self, data_dir: std::path::PathBuf) -> bool {
		if data_dir.is_dir() {
			self.data_dir = data_dir;
			true
		} else {
			false
		}
	}

	/// Location of the serialized package database snapshot.
	pub fn db_path(&self) -> std::path::PathBuf {
		self.data_dir.join("packagedb.bin")
	}

	pub fn beam_width(&self) -> usize {
		self.beam_width
	}
	pub fn set_beam_width(&mut self, beam_width: usize) {
		self.beam_width = beam_width;
	}

	pub fn count(&self) -> usize {
		self.count
	}
	pub fn set_count(&mut self, count: usize) {
		self.count = count;
	}
}
