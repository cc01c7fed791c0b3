use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::build::{transform_script, MARKER};
use crate::{BaseLauncher, BuildError, EmbeddedPayload, ImportName, PackError, Packer, SearchPaths};

const LAUNCHER: &[u8] = b"\x7fELF\x02\x01\x01 base launcher";

const OS_MODULE: &[u8] = b"# os\nsep = '/'\n";
const COLLECTIONS_MODULE: &[u8] = b"# collections\nclass OrderedDict(dict): pass\n";
const JSON_MODULE: &[u8] = b"# json\ndef dumps(obj): pass\n";
const POSIXPATH_MODULE: &[u8] = b"# posixpath\nsep = '/'\n";

struct Workspace {
    _temp: TempDir,
    project: PathBuf,
    site: PathBuf,
    out: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp.path()).unwrap();
        let project = root.join("project");
        let site = root.join("site");
        let out = root.join("out");

        write(&site.join("os.py"), OS_MODULE);
        write(&site.join("posixpath.py"), POSIXPATH_MODULE);
        write(&site.join("collections").join("__init__.py"), COLLECTIONS_MODULE);
        write(&site.join("json").join("__init__.py"), JSON_MODULE);
        fs::create_dir_all(site.join("nspkg").join("inner")).unwrap();
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&out).unwrap();

        Self {
            _temp: temp,
            project,
            site,
            out,
        }
    }

    fn script(&self, name: &str, source: &str) -> PathBuf {
        let path = self.project.join(name);
        write(&path, source.as_bytes());
        path
    }

    fn packer(&self, output: &str) -> Packer {
        let search = SearchPaths::new([self.site.clone()])
            .with_builtins(["sys", "time"])
            .with_aliases([("os.path", Some(self.site.join("posixpath.py")))]);
        Packer::new(LAUNCHER.to_vec())
            .with_search_paths(search)
            .with_output(self.out.join(output))
    }

    fn out_entries(&self) -> usize {
        fs::read_dir(&self.out).unwrap().count()
    }
}

fn write(path: &Path, contents: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn expected_artifact(script: &str, modules: &[&[u8]]) -> Vec<u8> {
    let mut expected = LAUNCHER.to_vec();
    expected.extend_from_slice(MARKER);
    expected.extend_from_slice(&transform_script(script.as_bytes()));
    for module in modules {
        expected.extend_from_slice(module);
    }
    expected
}

macro_rules! create_tests {
    ($($name:ident: $source:expr => [$($import:expr),*] => [$($module:expr),*],)*) => { $(
        #[test]
        fn $name() {
            let workspace = Workspace::new();
            let script = workspace.script("script.py", $source);
            let outcome = workspace.packer("script.exe").pack(&script).unwrap();

            let imports = outcome
                .imports
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            let expected_imports: Vec<&str> = vec![$($import),*];
            assert_eq!(imports, expected_imports);

            let expected_modules: Vec<&[u8]> = vec![$($module),*];
            let bytes = fs::read(outcome.artifact.path()).unwrap();
            assert_eq!(bytes, expected_artifact($source, &expected_modules));
            assert_eq!(outcome.artifact.size(), bytes.len());
            assert_eq!(outcome.artifact.embedded_modules(), expected_modules.len());
        }
    )* }
}

create_tests! {
    zero_imports_embed_only_the_script:
        "print('hello')\n" => [] => [],
    demo_script_embeds_modules_in_mapping_order:
        "import os\nfrom collections import OrderedDict\n"
            => ["collections", "collections.OrderedDict", "os"]
            => [COLLECTIONS_MODULE, OS_MODULE],
    builtins_and_namespaces_add_no_bytes:
        "import sys\nimport nspkg.inner\n" => ["nspkg.inner", "sys"] => [],
    nested_imports_are_embedded:
        "def main():\n    if True:\n        import json\n" => ["json"] => [JSON_MODULE],
    star_imports_embed_only_the_module:
        "from os import *\n" => ["os"] => [OS_MODULE],
    modules_sharing_a_file_name_are_all_embedded:
        "import json\nimport collections\n"
            => ["collections", "json"]
            => [COLLECTIONS_MODULE, JSON_MODULE],
    loaded_submodule_aliases_are_embedded:
        "from os import path\n" => ["os", "os.path"] => [OS_MODULE, POSIXPATH_MODULE],
    unresolved_names_are_left_out:
        "import does_not_exist\nimport os\n" => ["does_not_exist", "os"] => [OS_MODULE],
}

#[cfg(unix)]
#[test]
fn artifacts_are_executable() {
    use std::os::unix::fs::PermissionsExt;

    let workspace = Workspace::new();
    let script = workspace.script("demo.py", "import os\n");
    let outcome = workspace.packer("demo.exe").pack(&script).unwrap();

    let mode = fs::metadata(outcome.artifact.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o775);
}

#[test]
fn packaging_is_idempotent() {
    let workspace = Workspace::new();
    let script = workspace.script("demo.py", "import os\nfrom collections import OrderedDict\n");
    let packer = workspace.packer("demo.exe");

    let first = fs::read(packer.pack(&script).unwrap().artifact.path()).unwrap();
    let second = fs::read(packer.pack(&script).unwrap().artifact.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(workspace.out_entries(), 1);
}

#[test]
fn embedded_script_round_trips() {
    let workspace = Workspace::new();
    let source = "import os\n\nif __name__ == '__main__':\n    print(os.sep)";
    let script = workspace.script("demo.py", source);
    let outcome = workspace.packer("demo.exe").pack(&script).unwrap();

    let bytes = fs::read(outcome.artifact.path()).unwrap();
    let payload = EmbeddedPayload::split_at_launcher(&bytes, LAUNCHER.len()).unwrap();
    assert_eq!(payload.launcher(), LAUNCHER);

    let mut expected_script = source.as_bytes().to_vec();
    expected_script.extend_from_slice(b"\nexit()\n#");
    assert_eq!(payload.script(), Some(expected_script.as_slice()));
    assert_eq!(payload.modules(), OS_MODULE);

    // The script on disk is never modified
    assert_eq!(fs::read_to_string(&script).unwrap(), source);
}

#[test]
fn scripts_containing_the_terminator_round_trip() {
    let workspace = Workspace::new();
    let source = "print(1)\nexit()\n# done\n";
    let script = workspace.script("demo.py", source);
    let outcome = workspace.packer("demo.exe").pack(&script).unwrap();

    let bytes = fs::read(outcome.artifact.path()).unwrap();
    let payload = EmbeddedPayload::split_at_launcher(&bytes, LAUNCHER.len())
        .and_then(|payload| payload.with_script_len(source.len()))
        .unwrap();

    assert_eq!(payload.script(), Some(transform_script(source.as_bytes()).as_slice()));
    assert!(payload.modules().is_empty());
}

#[test]
fn mapping_only_contains_scanned_names() {
    let workspace = Workspace::new();
    let script = workspace.script(
        "demo.py",
        "import os, sys, missing\nfrom collections import OrderedDict, abc\n",
    );
    let outcome = workspace.packer("demo.exe").pack(&script).unwrap();

    for module in outcome.resolution.modules() {
        assert!(outcome.imports.contains(module.name()));
    }
    for miss in outcome.resolution.misses() {
        assert!(outcome.imports.contains(miss.name()));
    }
    assert_eq!(
        outcome.resolution.modules().len() + outcome.resolution.misses().len(),
        outcome.imports.len()
    );
}

#[test]
fn relative_imports_resolve_against_the_script_directory() {
    let workspace = Workspace::new();
    write(&workspace.project.join("helpers.py"), b"# helpers\n");
    let script = workspace.script("demo.py", "from . import helpers\n");
    let outcome = workspace.packer("demo.exe").pack(&script).unwrap();

    let helpers = outcome
        .resolution
        .get(&ImportName::relative(1, "helpers"))
        .unwrap();
    assert_eq!(helpers.path(), Some(workspace.project.join("helpers.py").as_path()));

    let bytes = fs::read(outcome.artifact.path()).unwrap();
    assert!(bytes.ends_with(b"\nexit()\n## helpers\n"));
}

#[test]
fn script_directory_shadows_search_roots() {
    let workspace = Workspace::new();
    write(&workspace.project.join("os.py"), b"# local os\n");
    let script = workspace.script("demo.py", "import os\n");
    let outcome = workspace.packer("demo.exe").pack(&script).unwrap();

    let bytes = fs::read(outcome.artifact.path()).unwrap();
    assert!(bytes.ends_with(b"# local os\n"));
}

#[test]
fn output_may_not_replace_the_script() {
    let workspace = Workspace::new();
    let script = workspace.script("demo.py", "import os\n");
    let err = workspace
        .packer("unused.exe")
        .with_output(&script)
        .pack(&script)
        .unwrap_err();

    assert!(matches!(err, PackError::Build(BuildError::OutputIsInput)));
    assert_eq!(fs::read_to_string(&script).unwrap(), "import os\n");
}

#[test]
fn missing_launcher_leaves_no_artifact() {
    let workspace = Workspace::new();
    let script = workspace.script("demo.py", "import os\n");
    let err = Packer::new(BaseLauncher::File(workspace.project.join("_missing.exe")))
        .with_output(workspace.out.join("demo.exe"))
        .pack(&script)
        .unwrap_err();

    assert!(matches!(err, PackError::Build(BuildError::ReadLauncher { .. })));
    assert_eq!(workspace.out_entries(), 0);
}

#[test]
fn invalid_scripts_produce_no_artifact() {
    let workspace = Workspace::new();
    let script = workspace.script("broken.py", "import os\ndef broken(:\n");
    let err = workspace.packer("broken.exe").pack(&script).unwrap_err();

    assert!(matches!(err, PackError::Scan(_)));
    assert_eq!(workspace.out_entries(), 0);
}
