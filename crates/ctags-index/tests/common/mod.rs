#![allow(dead_code)]

use std::path::PathBuf;

use ctags_index::Settings;
use tower_lsp::lsp_types::Position;

/// Copies its first argument to the `-f` output, standing in for `ctags`:
/// `sh -c SCRIPT ctags <source> -f <out> .`
const FAKE_GENERATOR: &str =
    "src=\"$1\"; while [ \"$#\" -gt 0 ]; do if [ \"$1\" = \"-f\" ]; then out=\"$2\"; fi; shift; done; cp \"$src\" \"$out\"";

pub const SAMPLE_TABLE: &str = "!_TAG_FILE_FORMAT\t2\t/extended format/\n\
                                !_TAG_FILE_SORTED\t1\t/0=unsorted, 1=sorted, 2=foldcase/\n\
                                bart\tbart.c\t3\n\
                                foo\tbar.c\t10\n\
                                foo\tbaz.c\t/^int foo() {$/;\"\tf\n\
                                foobar\tsrc/foobar.c\t/^void foobar(void)$/;\"\tf\n";

pub const BAZ_SOURCE: &str = "#include \"baz.h\"\n\nint foo() {\n    return 42;\n}\n";

/// A scratch directory under the system temp dir, removed on drop.
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(name: &str) -> Self {
        let nanos =
            std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
        let root = std::env::temp_dir().join(format!("ctags_index_{name}_{}_{nanos}", std::process::id()));
        std::fs::create_dir_all(&root).expect("create workspace");
        Self {
            root,
        }
    }

    /// The sample table installed as `tags`, with `baz.c` present on disk.
    pub fn with_sample(name: &str) -> Self {
        let workspace = Self::new(name);
        workspace.write("tags", SAMPLE_TABLE);
        workspace.write("baz.c", BAZ_SOURCE);
        workspace
    }

    pub fn path(
        &self,
        relative: &str,
    ) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(
        &self,
        relative: &str,
        content: &str,
    ) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(&path, content).expect("write file");
        path
    }

    pub fn read(
        &self,
        relative: &str,
    ) -> String {
        std::fs::read_to_string(self.path(relative)).expect("read file")
    }

    /// Leftover `<table>.<pid>.<seq>.tmp` files.
    pub fn temp_tables(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.root)
            .expect("list workspace")
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "tmp"))
            .collect()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

/// Settings whose generator copies the file named by the first extra
/// argument into the table.
pub fn fake_generator_settings() -> Settings {
    let mut settings = Settings::default();
    settings.tags.command = "sh".to_string();
    settings.tags.args = vec!["-c".to_string(), FAKE_GENERATOR.to_string(), "ctags".to_string()];
    settings
}

/// Settings whose generator writes one `new_sym` record, then exits 1.
pub fn erroring_generator_settings() -> Settings {
    let script = concat!(
        r#"while [ "$#" -gt 0 ]; do if [ "$1" = "-f" ]; then out="$2"; fi; shift; done; "#,
        r#"printf 'new_sym\tb.c\t3\n' > "$out"; echo 'ctags: warning' >&2; exit 1"#,
    );
    let mut settings = Settings::default();
    settings.tags.command = "sh".to_string();
    settings.tags.args = vec!["-c".to_string(), script.to_string(), "ctags".to_string()];
    settings
}

/// Settings whose generator fails without writing anything.
pub fn failing_generator_settings() -> Settings {
    let mut settings = Settings::default();
    settings.tags.command = "sh".to_string();
    settings.tags.args = vec!["-c".to_string(), "echo 'ctags: no input' >&2; exit 1".to_string(), "ctags".to_string()];
    settings
}

pub fn table_line(
    name: &str,
    file: &str,
    line: u32,
) -> String {
    format!("{name}\t{file}\t{line}\n")
}

pub fn position_of(
    source: &str,
    needle: &str,
) -> Position {
    let idx = source.find(needle).unwrap_or_else(|| panic!("needle not found: {needle}"));
    let before = &source[..idx];
    let line = before.matches('\n').count() as u32;
    let col = before.rsplit_once('\n').map_or(before, |(_, tail)| tail).encode_utf16().count() as u32;
    Position::new(line, col)
}
