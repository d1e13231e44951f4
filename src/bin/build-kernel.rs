use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use kernel_device_builder::device::register_custom_devices;
use kernel_device_builder::{dumpvars, fragments, logging, preflight};
use kernel_device_builder::{Arch, BuildConfig, Device, DeviceRegistry, OutputLayout};

#[derive(Parser)]
#[command(name = "build-kernel", version, about = "Kernel device registry and build planner")]
struct Cli {
    /// Build config file (default: ./build-kernel.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered devices
    List {
        /// Only devices targeting this architecture
        #[arg(long)]
        arch: Option<String>,
    },
    /// Print a device's build variables
    Dumpvars {
        codename: String,
        #[arg(long)]
        json: bool,
    },
    /// Show defconfig goals and output layout for a device
    Plan {
        codename: String,
        /// Create the output and object directories
        #[arg(long)]
        create_dirs: bool,
    },
    /// Verify host tools and the device's config files in the kernel tree
    Check { codename: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = BuildConfig::load(cli.config.as_deref())?;
    let registry = load_registry(&config)?;

    match &cli.command {
        Command::List { arch } => {
            let arch = arch.as_deref().map(str::parse::<Arch>).transpose()?;
            for device in registry
                .iter()
                .filter(|device| arch.map_or(true, |arch| device.target_arch == arch))
            {
                println!("{}", device.product_device);
            }
            Ok(())
        }
        Command::Dumpvars { codename, json } => {
            let device = registry.require(codename)?;
            let layout = OutputLayout::new(&config.out_dir, device);
            let vars = dumpvars::dumpvars(device, &layout);
            if *json {
                println!("{}", dumpvars::render_json(&vars)?);
            } else {
                print!("{}", dumpvars::render_text(&vars));
            }
            Ok(())
        }
        Command::Plan {
            codename,
            create_dirs,
        } => plan(&config, registry.require(codename)?, *create_dirs),
        Command::Check { codename } => check(&config, registry.require(codename)?),
    }
}

fn load_registry(config: &BuildConfig) -> Result<DeviceRegistry> {
    let mut registry = DeviceRegistry::with_builtin().context("registering built-in devices")?;
    register_custom_devices(&mut registry, &config.devices)?;
    info!(devices = registry.len(), "device registry ready");
    Ok(registry)
}

fn plan(config: &BuildConfig, device: &Device, create_dirs: bool) -> Result<()> {
    let layout = OutputLayout::new(&config.out_dir, device);

    println!("[{}] defconfig goals:", device.product_device);
    for target in device.defconfig_targets() {
        println!("  {}", target);
    }
    println!("[{}] make arguments:", device.product_device);
    println!("  -C {}", config.kernel_source.display());
    println!("  O={}", layout.kernel_obj_path.display());
    println!("  ARCH={}", device.target_arch.kernel_name());
    println!("  CLANG_TRIPLE={}", device.target_arch.clang_triple_prefix());
    println!("[{}] expected artifacts:", device.product_device);
    for artifact in layout.expected_artifacts() {
        println!("  {}", artifact.display());
    }

    if create_dirs {
        layout.ensure_dirs()?;
        info!(out = %layout.out_path.display(), "output directories ready");
    }
    Ok(())
}

fn check(config: &BuildConfig, device: &Device) -> Result<()> {
    let kernel_source = &config.kernel_source;
    let resolved = preflight::check_build_inputs(preflight::REQUIRED_TOOLS, kernel_source, device)
        .with_context(|| {
            format!(
                "checking build inputs for '{}' in '{}'",
                device.product_device,
                kernel_source.display()
            )
        })?;
    for config_file in &resolved {
        println!("  \u{2713} {}", config_file.name);
    }

    let fingerprint = fragments::fingerprint(kernel_source, device)?;
    println!("[{}] config fingerprint: {}", device.product_device, fingerprint);
    Ok(())
}
