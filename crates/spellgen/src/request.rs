//! Template-kind dispatch: one typed answer payload per template, collected
//! through the operator prompts and handed to the renderer.

use crate::{
    cauldron::{collect_cauldron_parameters, select_network, CauldronScriptParameters},
    chain::ChainConnect,
    cli_output,
    config::{chain_id_ident, GenConfig, NetworkCfg, NetworkSelection},
    errors::GenError,
    project,
    prompt::Prompter,
    render,
};
use eyre::Context as _;
use serde::Serialize;
use std::path::PathBuf;

/// The template kinds the CLI accepts, spelled the way operators type them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Script,
    ScriptCauldron,
    Interface,
    Contract,
    ContractMagicVault,
    BlastWrapped,
    Test,
}

impl TemplateKind {
    /// Parse the CLI positional. Unknown values are a terminal error.
    pub fn parse(raw: &str) -> Result<Self, GenError> {
        match raw {
            "script" => Ok(Self::Script),
            "script:cauldron" => Ok(Self::ScriptCauldron),
            "interface" => Ok(Self::Interface),
            "contract" => Ok(Self::Contract),
            "contract:magic-vault" => Ok(Self::ContractMagicVault),
            "blast-wrapped" => Ok(Self::BlastWrapped),
            "test" => Ok(Self::Test),
            _ => Err(GenError::UnknownTemplate(raw.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptAnswers {
    pub script_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CauldronScriptAnswers {
    pub script_name: String,
    #[serde(flatten)]
    pub parameters: CauldronScriptParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterfaceAnswers {
    pub interface_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractAnswers {
    pub contract_name: String,
    pub operatable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MagicVaultAnswers {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlastWrappedAnswers {
    pub contract_name: String,
}

/// Whether a generated test is one flat contract or a shared base contract
/// with a per-suite subcontract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    Simple,
    Multi,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestAnswers {
    pub test_name: String,
    /// Deploy script the test binds to, if any.
    pub script_name: Option<String>,
    pub network: NetworkSelection,
    pub chain_id_ident: String,
    pub block_number: u64,
    pub deploy_variables: Vec<String>,
    pub deploy_return_values: Vec<String>,
}

/// A fully-collected generation request: template id, destination folder,
/// output filename, and the typed payload it renders with.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Script {
        filename: String,
        destination: String,
        answers: ScriptAnswers,
    },
    ScriptCauldron {
        filename: String,
        destination: String,
        answers: Box<CauldronScriptAnswers>,
    },
    Interface {
        filename: String,
        destination: String,
        answers: InterfaceAnswers,
    },
    Contract {
        filename: String,
        destination: String,
        answers: ContractAnswers,
    },
    MagicVault {
        filename: String,
        destination: String,
        answers: MagicVaultAnswers,
    },
    BlastWrapped {
        filename: String,
        destination: String,
        answers: BlastWrappedAnswers,
    },
    Test {
        filename: String,
        destination: String,
        mode: TestMode,
        answers: TestAnswers,
    },
}

impl GenerationRequest {
    /// Id of the embedded template this request renders.
    pub fn template_id(&self) -> &'static str {
        match self {
            Self::Script { .. } => "script",
            Self::ScriptCauldron { .. } => "script-cauldron",
            Self::Interface { .. } => "interface",
            Self::Contract { .. } => "contract",
            Self::MagicVault { .. } => "contract-magic-vault",
            Self::BlastWrapped { .. } => "blast-wrapped",
            Self::Test {
                mode: TestMode::Simple,
                ..
            } => "test",
            Self::Test {
                mode: TestMode::Multi,
                ..
            } => "test-multi",
        }
    }

    /// Render this request and write the output file; returns the path.
    pub fn render_to_file(&self) -> eyre::Result<PathBuf> {
        let id = self.template_id();
        match self {
            Self::Script {
                filename,
                destination,
                answers,
            } => render::render_to_file(id, answers, destination, filename),
            Self::ScriptCauldron {
                filename,
                destination,
                answers,
            } => render::render_to_file(id, answers, destination, filename),
            Self::Interface {
                filename,
                destination,
                answers,
            } => render::render_to_file(id, answers, destination, filename),
            Self::Contract {
                filename,
                destination,
                answers,
            } => render::render_to_file(id, answers, destination, filename),
            Self::MagicVault {
                filename,
                destination,
                answers,
            } => render::render_to_file(id, answers, destination, filename),
            Self::BlastWrapped {
                filename,
                destination,
                answers,
            } => render::render_to_file(id, answers, destination, filename),
            Self::Test {
                filename,
                destination,
                answers,
                ..
            } => render::render_to_file(id, answers, destination, filename),
        }
    }
}

/// Ask everything `kind` needs and assemble the request.
pub async fn collect(
    kind: TemplateKind,
    cfg: &GenConfig,
    prompter: &mut dyn Prompter,
    connect: &dyn ChainConnect,
) -> eyre::Result<GenerationRequest> {
    match kind {
        TemplateKind::Script => {
            let script_name = prompter.input("Script Name")?;
            let filename = prompter.input_or_default("Filename", &format!("{script_name}.s.sol"))?;
            Ok(GenerationRequest::Script {
                filename,
                destination: cfg.foundry.script.clone(),
                answers: ScriptAnswers { script_name },
            })
        }
        TemplateKind::ScriptCauldron => {
            let script_name = prompter.input("Script Name")?;
            let filename = prompter.input_or_default("Filename", &format!("{script_name}.s.sol"))?;
            let parameters = collect_cauldron_parameters(cfg, prompter, connect).await?;
            Ok(GenerationRequest::ScriptCauldron {
                filename,
                destination: cfg.foundry.script.clone(),
                answers: Box::new(CauldronScriptAnswers {
                    script_name,
                    parameters,
                }),
            })
        }
        TemplateKind::Interface => {
            let interface_name = prompter.input("Interface Name")?;
            let filename = prompter.input_or_default("Filename", &format!("{interface_name}.sol"))?;
            Ok(GenerationRequest::Interface {
                filename,
                destination: format!("{}/interfaces", cfg.foundry.src),
                answers: InterfaceAnswers { interface_name },
            })
        }
        TemplateKind::Contract => {
            let contract_name = prompter.input("Contract Name")?;
            let filename = prompter.input_or_default("Filename", &format!("{contract_name}.sol"))?;
            let operatable = prompter.confirm("Operatable", false)?;
            let destination = select_destination(cfg, prompter)?;
            Ok(GenerationRequest::Contract {
                filename,
                destination,
                answers: ContractAnswers {
                    contract_name,
                    operatable,
                },
            })
        }
        TemplateKind::ContractMagicVault => {
            let name = prompter.input("Name")?;
            let filename = prompter.input_or_default("Filename", &format!("Magic{name}.sol"))?;
            let destination = select_destination(cfg, prompter)?;
            Ok(GenerationRequest::MagicVault {
                filename,
                destination,
                answers: MagicVaultAnswers { name },
            })
        }
        TemplateKind::BlastWrapped => {
            let contract_name = prompter.input("Contract Name")?;
            let filename = prompter.input_or_default("Filename", &format!("{contract_name}.sol"))?;
            let destination = select_destination(cfg, prompter)?;
            Ok(GenerationRequest::BlastWrapped {
                filename,
                destination,
                answers: BlastWrappedAnswers { contract_name },
            })
        }
        TemplateKind::Test => collect_test(cfg, prompter, connect).await,
    }
}

fn select_destination(cfg: &GenConfig, prompter: &mut dyn Prompter) -> eyre::Result<String> {
    let folders = project::destination_folders(&cfg.foundry.src, &cfg.foundry.utils);
    let idx = prompter.select("Destination Folder", &folders)?;
    folders
        .get(idx)
        .cloned()
        .ok_or_else(|| eyre::eyre!("destination choice out of range"))
}

async fn collect_test(
    cfg: &GenConfig,
    prompter: &mut dyn Prompter,
    connect: &dyn ChainConnect,
) -> eyre::Result<GenerationRequest> {
    let test_name = prompter.input("Test Name")?;

    let mut script_choices = vec!["(None)".to_owned()];
    script_choices.extend(project::script_names(&cfg.foundry.script));
    let script_idx = prompter.select("Script", &script_choices)?;
    let script_name = if script_idx == 0 {
        None
    } else {
        script_choices.get(script_idx).cloned()
    };

    let mode_choices = vec![
        "Simple".to_owned(),
        "Multi (base test-contract with per-suite contracts)".to_owned(),
    ];
    let mode = if prompter.select("Test Type", &mode_choices)? == 0 {
        TestMode::Simple
    } else {
        TestMode::Multi
    };

    let network = select_network(cfg, prompter)?;
    let block_number = input_block_number(prompter, connect, network).await?;
    let filename = prompter.input_or_default("Filename", &format!("{test_name}.t.sol"))?;

    let (deploy_variables, deploy_return_values) = match &script_name {
        Some(name) => {
            let path = PathBuf::from(&cfg.foundry.script).join(format!("{name}.s.sol"));
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))?;
            match project::deploy_returns(&source)? {
                Some(returns) => (returns.declarations, returns.return_names),
                None => (vec![], vec![]),
            }
        }
        None => (vec![], vec![]),
    };

    Ok(GenerationRequest::Test {
        filename,
        destination: cfg.foundry.test.clone(),
        mode,
        answers: TestAnswers {
            test_name,
            script_name,
            network: NetworkSelection::from(network),
            chain_id_ident: chain_id_ident(&network.name),
            block_number,
            deploy_variables,
            deploy_return_values,
        },
    })
}

/// Ask for the fork block: `latest` resolves the current head over RPC, an
/// explicit number is taken as-is, anything else re-prompts.
async fn input_block_number(
    prompter: &mut dyn Prompter,
    connect: &dyn ChainConnect,
    network: &NetworkCfg,
) -> eyre::Result<u64> {
    loop {
        let answer = prompter.input_or_default("Block", "latest")?;
        if answer == "latest" {
            let reader = connect.connect(network)?;
            let head = reader
                .block_number()
                .await
                .with_context(|| format!("get latest block on {}", network.name))?;
            cli_output::note(&format!("Using Block: {head}"));
            return Ok(head);
        }
        match answer.trim().parse::<u64>() {
            Ok(n) => return Ok(n),
            Err(_) => cli_output::warn(&format!("{answer} is not a block number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{FakeConnect, FakeReader};
    use crate::prompt::ScriptedPrompter;
    use std::fs;

    fn cfg_in(dir: &std::path::Path) -> GenConfig {
        GenConfig {
            foundry: crate::config::FoundryLayout {
                src: dir.join("src").to_string_lossy().into_owned(),
                script: dir.join("script").to_string_lossy().into_owned(),
                test: dir.join("test").to_string_lossy().into_owned(),
                utils: dir.join("utils").to_string_lossy().into_owned(),
            },
            ..GenConfig::default()
        }
    }

    #[test]
    fn template_kinds_parse_their_cli_spellings() -> eyre::Result<()> {
        assert_eq!(TemplateKind::parse("script")?, TemplateKind::Script);
        assert_eq!(
            TemplateKind::parse("script:cauldron")?,
            TemplateKind::ScriptCauldron
        );
        assert_eq!(TemplateKind::parse("interface")?, TemplateKind::Interface);
        assert_eq!(TemplateKind::parse("contract")?, TemplateKind::Contract);
        assert_eq!(
            TemplateKind::parse("contract:magic-vault")?,
            TemplateKind::ContractMagicVault
        );
        assert_eq!(
            TemplateKind::parse("blast-wrapped")?,
            TemplateKind::BlastWrapped
        );
        assert_eq!(TemplateKind::parse("test")?, TemplateKind::Test);
        Ok(())
    }

    #[test]
    fn unknown_template_kind_is_a_terminal_error() {
        let parsed = TemplateKind::parse("cauldron");
        assert_eq!(
            parsed,
            Err(GenError::UnknownTemplate("cauldron".to_owned()))
        );
    }

    #[tokio::test]
    async fn script_request_defaults_filename_and_destination() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = cfg_in(dir.path());
        let connect = FakeConnect(FakeReader::default());
        let mut prompter = ScriptedPrompter::new(["MyCauldron", ""]);

        let request = collect(TemplateKind::Script, &cfg, &mut prompter, &connect).await?;
        match request {
            GenerationRequest::Script {
                filename,
                destination,
                answers,
            } => {
                assert_eq!(filename, "MyCauldron.s.sol");
                assert_eq!(destination, cfg.foundry.script);
                assert_eq!(answers.script_name, "MyCauldron");
            }
            other => eyre::bail!("unexpected request: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_request_binds_a_script_and_extracts_returns() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = cfg_in(dir.path());
        fs::create_dir_all(&cfg.foundry.script)?;
        fs::write(
            PathBuf::from(&cfg.foundry.script).join("MyCauldron.s.sol"),
            "function deploy() public returns (ICauldronV4 cauldron, address safe) {}",
        )?;
        let connect = FakeConnect(FakeReader {
            head: 19_000_000,
            ..FakeReader::default()
        });

        let mut prompter = ScriptedPrompter::new([
            "MyCauldronTest", // test name
            "MyCauldron",     // bound script
            "Simple",         // test type
            "mainnet",        // network
            "",               // block -> latest
            "",               // filename -> default
        ]);
        let request = collect(TemplateKind::Test, &cfg, &mut prompter, &connect).await?;

        assert_eq!(request.template_id(), "test");
        match request {
            GenerationRequest::Test {
                filename, answers, ..
            } => {
                assert_eq!(filename, "MyCauldronTest.t.sol");
                assert_eq!(answers.script_name.as_deref(), Some("MyCauldron"));
                assert_eq!(answers.block_number, 19_000_000);
                assert_eq!(answers.chain_id_ident, "ChainId.Mainnet");
                assert_eq!(answers.network.chain_id, 1);
                assert_eq!(
                    answers.deploy_variables,
                    vec!["ICauldronV4 cauldron".to_owned(), "address safe".to_owned()]
                );
                assert_eq!(
                    answers.deploy_return_values,
                    vec!["cauldron".to_owned(), "safe".to_owned()]
                );
            }
            other => eyre::bail!("unexpected request: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn unbound_multi_test_uses_an_explicit_block() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = cfg_in(dir.path());
        let connect = FakeConnect(FakeReader::default());

        let mut prompter = ScriptedPrompter::new([
            "Vaults",
            "(None)",
            "Multi (base test-contract with per-suite contracts)",
            "arbitrum",
            "not-a-block",
            "250000000",
            "",
        ]);
        let request = collect(TemplateKind::Test, &cfg, &mut prompter, &connect).await?;

        assert_eq!(request.template_id(), "test-multi");
        match request {
            GenerationRequest::Test { answers, .. } => {
                assert_eq!(answers.script_name, None);
                assert_eq!(answers.block_number, 250_000_000);
                assert_eq!(answers.chain_id_ident, "ChainId.Arbitrum");
                assert!(answers.deploy_variables.is_empty());
            }
            other => eyre::bail!("unexpected request: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn contract_request_selects_a_destination_folder() -> eyre::Result<()> {
        let dir = tempfile::tempdir()?;
        let cfg = cfg_in(dir.path());
        fs::create_dir_all(PathBuf::from(&cfg.foundry.src).join("mixins"))?;
        let connect = FakeConnect(FakeReader::default());

        let mixins = PathBuf::from(&cfg.foundry.src)
            .join("mixins")
            .to_string_lossy()
            .into_owned();
        let mut prompter = ScriptedPrompter::new([
            "Registry".to_owned(),
            String::new(), // filename default
            "y".to_owned(),
            mixins.clone(),
        ]);
        let request = collect(TemplateKind::Contract, &cfg, &mut prompter, &connect).await?;

        match request {
            GenerationRequest::Contract {
                filename,
                destination,
                answers,
            } => {
                assert_eq!(filename, "Registry.sol");
                assert_eq!(destination, mixins);
                assert!(answers.operatable);
            }
            other => eyre::bail!("unexpected request: {other:?}"),
        }
        Ok(())
    }
}
