// World GPA - command line calculator
// Lists grading systems, prints scales, computes a GPA and searches universities

use anyhow::{bail, Context, Result};
use bpaf::*;
use std::path::PathBuf;
use tracing::info;
use world_gpa::{
    gpa_breakdown, universities, CalculatorSession, Config, ConfiguredSource, CourseField,
    FetchError, GradingCatalog, GradingService, KindFilter, RateGate, SystemClock, UniversityFilter,
};

/// One `--course CREDITS:GRADE[:NAME]` argument
#[derive(Debug, Clone, PartialEq)]
struct CourseSpec {
    credits: String,
    grade: String,
    name: String,
}

fn parse_course_spec(raw: &str) -> Result<CourseSpec, String> {
    let mut parts = raw.splitn(3, ':');
    let credits = parts.next().unwrap_or_default().trim();
    let grade = parts.next().unwrap_or_default().trim();
    let name = parts.next().unwrap_or_default().trim();

    if credits.is_empty() || grade.is_empty() {
        return Err(format!("expected CREDITS:GRADE[:NAME], got {:?}", raw));
    }

    Ok(CourseSpec {
        credits: credits.to_string(),
        grade: grade.to_string(),
        name: name.to_string(),
    })
}

#[derive(Debug, Clone)]
enum Cmd {
    /// Sorted country names
    Countries,
    /// Conversion scale of one country
    Scale { country: String, mode: String },
    /// Cumulative GPA of the given courses
    Calc {
        country: String,
        mode: String,
        courses: Vec<CourseSpec>,
    },
    /// Static university listing
    Universities(UniversityFilter),
}

#[derive(Debug, Clone)]
struct Options {
    csv: Option<PathBuf>,
    cmd: Cmd,
}

fn options_parser() -> OptionParser<Options> {
    fn country() -> impl Parser<String> {
        positional::<String>("COUNTRY").help("Country name as listed by `countries`")
    }

    fn mode() -> impl Parser<String> {
        long("mode")
            .short('m')
            .help("Grading mode (defaults to every mode of the country)")
            .argument::<String>("MODE")
            .fallback(String::new())
    }

    let countries = pure(Cmd::Countries)
        .to_options()
        .command("countries")
        .help("List countries with a grading system");

    let scale = {
        let country = country();
        let mode = mode();
        construct!(Cmd::Scale { country, mode })
            .to_options()
            .command("scale")
            .help("Print the conversion scale of a country")
    };

    let calc = {
        let country = country();
        let mode = mode();
        let courses = long("course")
            .short('c')
            .help("Course as CREDITS:GRADE[:NAME], repeatable")
            .argument::<String>("COURSE")
            .parse(|raw| parse_course_spec(&raw))
            .some("at least one --course is required");
        construct!(Cmd::Calc {
            country,
            mode,
            courses
        })
        .to_options()
        .command("calc")
        .help("Compute the cumulative GPA")
    };

    let universities = {
        let search = long("search")
            .short('s')
            .help("Match against name or location")
            .argument::<String>("TEXT")
            .fallback(String::new());
        let kind = long("kind")
            .short('k')
            .help("all, private or public")
            .argument::<String>("KIND")
            .parse(|raw| KindFilter::parse(&raw).ok_or_else(|| format!("unknown kind: {}", raw)))
            .fallback(KindFilter::All);
        let max_tuition = long("max-tuition")
            .help("Upper bound on yearly tuition in USD")
            .argument::<u64>("AMOUNT")
            .optional();
        construct!(UniversityFilter {
            search,
            kind,
            max_tuition
        })
        .map(Cmd::Universities)
        .to_options()
        .command("universities")
        .help("Search the university listing")
    };

    let csv = long("csv")
        .help("Read grading tables from a CSV export instead of Airtable")
        .argument::<PathBuf>("PATH")
        .optional();
    let cmd = construct!([countries, scale, calc, universities]);

    construct!(Options { csv, cmd })
        .to_options()
        .descr("International GPA calculator")
        .version(world_gpa::VERSION)
}

fn service(csv: Option<PathBuf>) -> Result<GradingService<ConfiguredSource>> {
    let mut config = Config::from_env().context("Failed to read configuration")?;
    if let Some(path) = csv {
        config = config.with_csv(path);
    }

    let source = config.build_source()?;
    Ok(GradingService::with_parts(
        source,
        SystemClock,
        chrono::Duration::seconds(config.cache_secs),
        RateGate::per_second(config.rate_per_sec),
    ))
}

fn fetch_failed(e: FetchError) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", e, e.detail())
}

fn print_scale(catalog: &GradingCatalog, country: &str, mode: &str) -> Result<()> {
    let Some(table) = catalog.table(country) else {
        bail!("Unknown country: {}", country);
    };

    let modes = table.modes();
    println!("🌍 {} ({})", country, modes.join(", "));

    let active = table.for_mode(mode);
    if active.is_empty() {
        bail!("Unknown grading mode {:?} for {}", mode, country);
    }

    for row in active.scale() {
        println!("   {}", row.label);
    }
    println!("\n   {}", active.grade_hint());
    Ok(())
}

fn run_calc(catalog: &GradingCatalog, country: &str, mode: &str, courses: &[CourseSpec]) -> Result<()> {
    if catalog.table(country).is_none() {
        bail!("Unknown country: {}", country);
    }

    let mut session = CalculatorSession::new();
    session.select_country(country);
    session.select_mode(mode);

    for (position, spec) in courses.iter().enumerate() {
        let index = if position == 0 { 0 } else { session.add_course() };
        session.update_course(index, CourseField::Course, &spec.name)?;
        session.update_course(index, CourseField::Credits, &spec.credits)?;
        session.update_course(index, CourseField::Grade, &spec.grade)?;
    }

    let errors = session.course_errors(catalog);
    for (course, error) in session.courses().as_slice().iter().zip(&errors) {
        let label = if course.course.is_empty() { &course.grade } else { &course.course };
        if let Some(kind) = error.credits {
            println!("⚠️  {}: {}", label, kind);
        }
        if let Some(kind) = error.grade {
            println!("⚠️  {}: {}", label, kind);
        }
    }

    let table = session.active_table(catalog);
    match gpa_breakdown(session.courses().as_slice(), table.entries()) {
        Some(breakdown) => {
            for c in &breakdown.contributions {
                println!("   {:<20} {:>5} credits × {:.2}", c.course, c.credits, c.points);
            }
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("🎓 Cumulative GPA: {:.2}", breakdown.gpa);
        }
        None => {
            println!("🎓 Cumulative GPA: {}", world_gpa::format_gpa(None));
            bail!("No GPA: fix the courses above");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    world_gpa::init_tracing();

    let options = options_parser().run();
    info!(version = world_gpa::VERSION, "world-gpa starting");

    match options.cmd {
        Cmd::Countries => {
            let service = service(options.csv)?;
            let countries = service.countries().await.map_err(fetch_failed)?;
            for country in countries.iter() {
                println!("{}", country);
            }
        }
        Cmd::Scale { country, mode } => {
            let service = service(options.csv)?;
            let catalog = service.grading_systems().await.map_err(fetch_failed)?;
            print_scale(&catalog, &country, &mode)?;
        }
        Cmd::Calc { country, mode, courses } => {
            let service = service(options.csv)?;
            let catalog = service.grading_systems().await.map_err(fetch_failed)?;
            run_calc(&catalog, &country, &mode, &courses)?;
        }
        Cmd::Universities(filter) => {
            let list = universities();
            let found = filter.apply(&list);
            if found.is_empty() {
                println!("No universities match");
            }
            for u in found {
                println!("🏛️  {} ({}, {})", u.name, u.location, u.kind.as_str());
                println!("    Ranking {} · Acceptance {} · Tuition {}", u.ranking, u.acceptance, u.tuition);
            }
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
