use clap::{Parser, Subcommand};
use pstate_core::units::pa;
use pstate_fluids::{
    Input, Measured, Species, StateClass, Substance, Unit, UnitState,
    create_state_class,
};
use std::error::Error;
use tracing::info;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "pstate")]
#[command(about = "Point-of-state explorer - fluid and humid-air properties", long_about = None)]
struct Cli {
    /// Round printed magnitudes to this many decimals
    #[arg(long, global = true)]
    digits: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every known variable of a pure-fluid state
    Fluid {
        /// Fluid name (catalog name, alias or any CoolProp identifier)
        substance: String,
        /// Independent variable as NAME=VALUE, e.g. T=20degC (exactly two)
        #[arg(short, long = "given", value_parser = parse_given, required = true)]
        given: Vec<(String, Input)>,
    },
    /// Show every known variable of a humid-air state
    HumidAir {
        /// Independent variable as NAME=VALUE, e.g. R=50% (two, plus optional P)
        #[arg(short, long = "given", value_parser = parse_given, required = true)]
        given: Vec<(String, Input)>,
        /// Pressure used when P is not given, e.g. 0.95bar
        #[arg(long)]
        pressure: Option<String>,
        /// Also show the dew point
        #[arg(long)]
        dew_point: bool,
        /// Also show the wet-bulb point
        #[arg(long)]
        bulb_point: bool,
    },
    /// Mix two humid-air states
    Mix {
        /// First state, NAME=VALUE (repeat)
        #[arg(short = 'a', long = "first", value_parser = parse_given, required = true)]
        first: Vec<(String, Input)>,
        /// Second state, NAME=VALUE (repeat)
        #[arg(short = 'b', long = "second", value_parser = parse_given, required = true)]
        second: Vec<(String, Input)>,
        /// Share of the second state in the mixture, between 0 and 1
        #[arg(short, long, default_value_t = 0.5)]
        fraction: f64,
        /// Number of points on the mixing line (prints the line instead of one state)
        #[arg(long)]
        line: Option<usize>,
    },
    /// List the variables a substance can report
    Variables {
        /// Fluid name or "HumidAir"
        substance: String,
    },
    /// List catalogued fluids
    Species,
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fluid { substance, given } => cmd_fluid(&substance, given, cli.digits),
        Commands::HumidAir {
            given,
            pressure,
            dew_point,
            bulb_point,
        } => cmd_humid_air(given, pressure.as_deref(), dew_point, bulb_point, cli.digits),
        Commands::Mix {
            first,
            second,
            fraction,
            line,
        } => cmd_mix(first, second, fraction, line, cli.digits),
        Commands::Variables { substance } => cmd_variables(&substance),
        Commands::Species => cmd_species(),
    }
}

fn cmd_fluid(substance: &str, given: Vec<(String, Input)>, digits: Option<i32>) -> CliResult<()> {
    let substance: Substance = substance.parse()?;
    if substance.is_humid_air() {
        return Err("use the humid-air command for humid air".into());
    }
    let class = create_state_class(substance, true, None)?;
    let state = class.unit_state(None, given)?;
    print_state("state", &state, digits);
    Ok(())
}

fn cmd_humid_air(
    given: Vec<(String, Input)>,
    pressure: Option<&str>,
    dew_point: bool,
    bulb_point: bool,
    digits: Option<i32>,
) -> CliResult<()> {
    let class = humid_air_class(pressure)?;
    let state = class.unit_state(Some("state"), given)?;
    print_state("state", &state, digits);

    if dew_point {
        print_state("dew point", &state.dew_point(Some("dew point"))?, digits);
    }
    if bulb_point {
        print_state("bulb point", &state.bulb_point(Some("bulb point"))?, digits);
    }
    Ok(())
}

fn cmd_mix(
    first: Vec<(String, Input)>,
    second: Vec<(String, Input)>,
    fraction: f64,
    line: Option<usize>,
    digits: Option<i32>,
) -> CliResult<()> {
    let class = humid_air_class(None)?;
    let a = class.unit_state(Some("first"), first)?;
    let b = class.unit_state(Some("second"), second)?;

    if let Some(n) = line {
        let points = a.core().mixing_line(b.core(), n)?;
        println!("{:>8} {:>12} {:>14} {:>10}", "f", "T [degC]", "W [g/kg]", "R [%]");
        for (i, p) in points.iter().enumerate() {
            let f = i as f64 / (n - 1) as f64;
            let t = Measured::new(p.get("T")?, Unit::Kelvin).magnitude_as(Unit::Celsius)?;
            let w = Measured::dimensionless(p.get("W")?).magnitude_as(Unit::GramPerKilogram)?;
            let r = Measured::dimensionless(p.get("R")?).magnitude_as(Unit::Percent)?;
            println!("{:>8.3} {:>12.2} {:>14.3} {:>10.1}", f, t, w, r);
        }
        return Ok(());
    }

    info!(fraction, "mixing states");
    let mixed = a.mix(&b, fraction, Some("mix"))?;
    print_state("first", &a, digits);
    print_state("second", &b, digits);
    print_state("mix", &mixed, digits);
    Ok(())
}

fn cmd_variables(substance: &str) -> CliResult<()> {
    let class = create_state_class(substance.parse()?, false, None)?;
    println!("Variables of {}:", class.name());
    for (name, unit) in class.acceptable_variables() {
        if unit == Unit::Dimensionless {
            println!("  {}", name);
        } else {
            println!("  {} [{}]", name, unit);
        }
    }
    Ok(())
}

fn cmd_species() -> CliResult<()> {
    println!("Catalogued fluids:");
    for species in Species::ALL {
        println!("  {:<16} {}", species.display_name(), species.coolprop_name());
    }
    Ok(())
}

fn humid_air_class(pressure: Option<&str>) -> CliResult<StateClass> {
    let default_pressure = match pressure {
        Some(text) => Some(pa(Measured::from_text(text)?.magnitude_as(Unit::Pascal)?)),
        None => None,
    };
    Ok(create_state_class(Substance::HumidAir, true, default_pressure)?)
}

fn print_state(title: &str, state: &UnitState, digits: Option<i32>) {
    println!("{}:", title);
    for (name, value) in state.known_variables_or_errors() {
        match value.map(|v| round(v, digits)) {
            Ok(v) => println!("  {:<6} = {}", name, v),
            Err(e) => println!("  {:<6} : {}", name, e),
        }
    }
}

fn round(value: Measured, digits: Option<i32>) -> Measured {
    match digits {
        Some(d) => value.round(d),
        None => value,
    }
}

/// Parse `NAME=VALUE`. A value without unit is passed as a bare number.
fn parse_given(text: &str) -> Result<(String, Input), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", text))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", text));
    }
    let measured = Measured::from_text(value).map_err(|e| e.to_string())?;
    let input = if measured.unit() == Unit::Dimensionless {
        Input::Bare(measured.magnitude())
    } else {
        Input::Measured(measured)
    };
    Ok((name.to_string(), input))
}
