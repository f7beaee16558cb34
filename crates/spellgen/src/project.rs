//! Discovery over the target Foundry project tree: destination folders,
//! existing deploy scripts, and deploy-signature extraction for generated
//! tests.

use eyre::Context as _;
use regex::Regex;
use std::path::Path;

/// Immediate subdirectories of `root` as display paths, sorted. A missing or
/// unreadable root yields an empty list rather than an error; discovery is
/// advisory.
fn subfolders(root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return vec![];
    };
    let mut found = vec![];
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            found.push(path.to_string_lossy().into_owned());
        }
    }
    found.sort();
    found
}

/// Candidate destination folders for generated contracts: every subfolder of
/// `src` and `utils`, plus `src` itself as the final fallback.
pub fn destination_folders(src: &str, utils: &str) -> Vec<String> {
    let mut folders = subfolders(Path::new(src));
    folders.extend(subfolders(Path::new(utils)));
    folders.push(src.to_owned());
    folders
}

/// Deploy-script basenames (`*.s.sol` with the extension stripped) found in
/// `script_dir`, sorted.
pub fn script_names(script_dir: &str) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(script_dir) else {
        return vec![];
    };
    let mut names = vec![];
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(base) = file_name.strip_suffix(".s.sol") {
            names.push(base.to_owned());
        }
    }
    names.sort();
    names
}

/// What a script's `deploy()` returns, extracted from its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReturns {
    /// Full declarations, e.g. `["ICauldronV4 cauldron", "address safe"]`.
    pub declarations: Vec<String>,
    /// Bare variable names, e.g. `["cauldron", "safe"]`.
    pub return_names: Vec<String>,
}

/// Extract the `function deploy() public returns (...)` declaration list from
/// a script source, if present. Generated tests re-declare these as state
/// variables and destructure `script.deploy()` into them.
pub fn deploy_returns(script_source: &str) -> eyre::Result<Option<DeployReturns>> {
    let re = Regex::new(r"function deploy\(\) public returns \(([^)]*)\)")
        .context("compile deploy returns pattern")?;
    let Some(captures) = re.captures(script_source) else {
        return Ok(None);
    };
    let Some(inner) = captures.get(1) else {
        return Ok(None);
    };

    let declarations: Vec<String> = inner
        .as_str()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if declarations.is_empty() {
        return Ok(None);
    }

    // The variable name is the last token of each declaration, which also
    // handles data-location keywords like `string memory name`.
    let mut return_names = Vec::with_capacity(declarations.len());
    for declaration in &declarations {
        let Some(last) = declaration.split_whitespace().last() else {
            continue;
        };
        return_names.push(last.to_owned());
    }

    Ok(Some(DeployReturns {
        declarations,
        return_names,
    }))
}
