//! Template rendering and output-file emission.

use eyre::Context as _;
use rand::Rng as _;
use serde::Serialize;
use std::collections::HashMap;
use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    path::{Path, PathBuf},
};
use tera::{Context as TeraContext, Tera, Value};

use crate::templates;

/// Every embedded template, keyed by template id.
const TEMPLATES: &[(&str, &str)] = &[
    ("script", templates::SCRIPT),
    ("script-cauldron", templates::SCRIPT_CAULDRON),
    ("interface", templates::INTERFACE),
    ("contract", templates::CONTRACT),
    ("contract-magic-vault", templates::CONTRACT_MAGIC_VAULT),
    ("blast-wrapped", templates::BLAST_WRAPPED),
    ("test", templates::TEST),
    ("test-multi", templates::TEST_MULTI),
];

/// Build the renderer: all embedded templates plus the `print_address` filter.
pub fn renderer() -> eyre::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())
        .context("register embedded templates")?;
    tera.register_filter("print_address", print_address);
    Ok(tera)
}

/// Render a named address for generated Solidity.
///
/// Named entries become `toolkit.getAddress("name")` so generated scripts
/// follow address-book updates at run time; unnamed entries are emitted as
/// their literal checksummed address.
fn print_address(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let address = value.get("address").and_then(Value::as_str).ok_or_else(|| {
        tera::Error::msg("print_address expects a named address with an `address` field")
    })?;
    let rendered = match value.get("name").and_then(Value::as_str) {
        Some(name) => format!("toolkit.getAddress(\"{name}\")"),
        None => address.to_owned(),
    };
    Ok(Value::String(rendered))
}

/// Render `template_id` with `payload` and write the result to
/// `destination/filename`; returns the written path.
pub fn render_to_file<T: Serialize>(
    template_id: &str,
    payload: &T,
    destination: &str,
    filename: &str,
) -> eyre::Result<PathBuf> {
    let tera = renderer()?;
    let context = TeraContext::from_serialize(payload).context("build template context")?;
    let rendered = tera
        .render(template_id, &context)
        .with_context(|| format!("render template {template_id}"))?;

    let path = Path::new(destination).join(filename);
    write_atomic(&path, &rendered)?;
    Ok(path)
}

fn tmp_path_for(parent: &Path, final_name: &Path) -> PathBuf {
    let base = final_name
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let mut rand_bytes = [0_u8; 8];
    rand::rng().fill_bytes(&mut rand_bytes);
    let suffix = hex::encode(rand_bytes);
    parent.join(format!(".{base}.tmp.{suffix}"))
}

/// Write through a fresh temp file in the destination directory, then rename,
/// so an interrupted run never leaves a partial output file behind.
fn write_atomic(path: &Path, contents: &str) -> eyre::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| eyre::eyre!("missing parent for {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;

    let tmp = tmp_path_for(parent, path);
    let mut f = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&tmp)
        .with_context(|| format!("open temp {}", tmp.display()))?;
    f.write_all(contents.as_bytes())
        .with_context(|| format!("write {}", tmp.display()))?;
    f.flush().with_context(|| format!("flush {}", tmp.display()))?;
    drop(f);

    // `rename` is atomic on Unix. On Windows it can fail if the destination exists.
    #[cfg(windows)]
    {
        if path.exists() {
            fs::remove_file(path).with_context(|| format!("remove existing {}", path.display()))?;
        }
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
