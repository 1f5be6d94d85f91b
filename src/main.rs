#![deny(clippy::all)]
#![forbid(unsafe_code)]

use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::PathBuf;

use itertools::Itertools;
use structopt::StructOpt;
use zip::ZipArchive;

use route_tool::nav::NavData;
use route_tool::route;
use route_tool::segment::SegmentKind;

static SEPARATOR: &str =
    "\n;===============================================================================\n";

#[derive(StructOpt)]
struct Args {
    /// Reference data: a directory of dataset files or a zip containing them
    #[structopt(name = "navdata", parse(from_os_str))]
    navdata: PathBuf,
    #[structopt(name = "routes", parse(from_os_str))]
    routes: PathBuf,
    #[structopt(
        short = "o",
        long = "output",
        parse(from_os_str),
        default_value = "./routes_report.txt"
    )]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::from_args();

    println!("Loading reference data...");
    let nav = if args.navdata.is_dir() {
        let dir = args.navdata.clone();
        NavData::load(|name| match std::fs::read_to_string(dir.join(name)) {
            Ok(text) => Some(text),
            Err(_) => {
                println!("WARN: Missing dataset {}, table left empty!", name);
                None
            }
        })
    } else {
        let mut archive = ZipArchive::new(BufReader::new(File::open(&args.navdata)?))?;
        NavData::load(|name| {
            let mut entry = match archive.by_name(name) {
                Ok(e) => e,
                Err(_) => {
                    println!("WARN: Missing dataset {}, table left empty!", name);
                    return None;
                }
            };
            let mut text = String::new();
            entry.read_to_string(&mut text).ok()?;
            Some(text)
        })
    };

    println!("Interpreting routes...");
    let mut input = String::new();
    File::open(&args.routes)?.read_to_string(&mut input)?;
    let lines = route::interpret(&nav, &input);

    let mut report = String::new();
    for line in &lines {
        for issue in &line.issues {
            println!("WARN: Line {}: {}", line.line_index + 1, issue);
        }

        report += SEPARATOR;
        report += &format!("; line {}: {}\n", line.line_index + 1, line.route_text);
        if let Some(color) = &line.color {
            report += &format!("; color {}\n", color);
        }
        report += &format!(
            "; points: {}\n",
            line.points.iter().map(|p| p.id.as_str()).join(" ")
        );

        for p in &line.points {
            report += &format!("{:7} {}\n", p.id, p.latlon.to_dms());
        }
        for s in &line.segments {
            let tag = match s.kind {
                SegmentKind::Mandatory => "SOLID ",
                SegmentKind::Advisory => "DASHED",
                SegmentKind::FacilityConnector => "FAN   ",
            };
            report += &format!(
                "{} {} {}  ; {}-{}\n",
                tag,
                s.a.latlon.to_dms(),
                s.b.latlon.to_dms(),
                s.a.id,
                s.b.id
            );
        }
    }

    println!("Writing report...");
    let mut output = File::create(&args.output)?;
    output.write_all(report.as_bytes())?;
    Ok(())
}
