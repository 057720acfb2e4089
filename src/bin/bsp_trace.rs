//! bsp_trace - load a level and trace one segment through it.
//!
//! USAGE:
//! ```bash
//! cargo run --bin bsp_trace -- \
//!     --bsp maps/kpdm1.bsp \
//!     --from 0,0,64 --to 0,0,-512 --mask solid
//! ```

use anyhow::{Context, bail};
use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;

use kingpin_rs::{
    Map,
    defs::ContentFlags,
    sim::{BrushModel, Origin},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Level file (IBSP v38)
    #[arg(long, value_name = "FILE")]
    bsp: PathBuf,

    /// Segment start `X,Y,Z`
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, allow_hyphen_values = true)]
    from: Option<Vec3>,

    /// Segment end `X,Y,Z`
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, allow_hyphen_values = true)]
    to: Option<Vec3>,

    /// Blocking contents: a mask name or a raw number (`0x...` accepted)
    #[arg(long, default_value = "solid", value_parser = parse_mask)]
    mask: ContentFlags,

    /// List the map entities
    #[arg(long)]
    entities: bool,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("`{p}`: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected X,Y,Z, got `{s}`")),
    }
}

fn parse_mask(s: &str) -> Result<ContentFlags, String> {
    let mask = match s.to_ascii_lowercase().as_str() {
        "all" => ContentFlags::MASK_ALL,
        "solid" => ContentFlags::MASK_SOLID,
        "player" => ContentFlags::MASK_PLAYER_SOLID,
        "dead" => ContentFlags::MASK_DEAD_SOLID,
        "monster" => ContentFlags::MASK_MONSTER_SOLID,
        "water" => ContentFlags::MASK_WATER,
        "opaque" => ContentFlags::MASK_OPAQUE,
        "shot" => ContentFlags::MASK_SHOT,
        "current" => ContentFlags::MASK_CURRENT,
        other => {
            let bits = match other.strip_prefix("0x") {
                Some(hex) => u32::from_str_radix(hex, 16),
                None => other.parse(),
            }
            .map_err(|_| format!("unknown mask `{s}`"))?;
            ContentFlags::from_bits_retain(bits)
        }
    };
    Ok(mask)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let map = Map::from_file(&opts.bsp)
        .with_context(|| format!("loading {}", opts.bsp.display()))?;
    let level = map.level();

    println!(
        "level `{}`: {} planes, {} nodes, {} leaves, {} brushes, {} models, sky {}",
        level.name,
        level.planes.len(),
        level.nodes.len(),
        level.leaves.len(),
        level.brushes.len(),
        level.models.len(),
        map.sky().unwrap_or("-"),
    );

    if opts.entities {
        for (i, props) in map.entity_properties().iter().enumerate() {
            let origin = props
                .origin()
                .map_or_else(|| "-".to_owned(), |o| format!("{} {} {}", o.x, o.y, o.z));
            println!(
                "{i:4}  {:<24} origin {:<20} {}",
                props.classname().unwrap_or("?"),
                origin,
                props.name().unwrap_or(""),
            );
        }
        let mut q = map.world().query::<(Option<&Origin>, Option<&BrushModel>)>();
        let (points, brushes) = q.iter().fold((0, 0), |(p, b), (_, (o, m))| {
            (p + o.is_some() as usize, b + m.is_some() as usize)
        });
        println!("spawned: {points} point entities, {brushes} brush entities");
    }

    let (start, end) = match (opts.from, opts.to) {
        (Some(a), Some(b)) => (a, b),
        (None, None) => return Ok(()),
        _ => bail!("--from and --to must be given together"),
    };

    let tr = map.line_trace(start, end, opts.mask);
    if !tr.hit {
        println!("clear: reached {}", tr.end_position);
        return Ok(());
    }
    if tr.start_solid {
        println!("start solid: contents {:?}", tr.contents);
        return Ok(());
    }

    println!("hit at fraction {:.4}", tr.fraction);
    println!("  position {}", tr.end_position);
    println!("  normal   {}", tr.plane_normal);
    println!("  axes     u {}  v {}", tr.axis_u, tr.axis_v);
    println!("  contents {:?}", tr.contents);
    println!("  surface  {:?}", tr.surface);
    if let Some(id) = tr.leaf {
        let leaf = &level.leaves[id as usize];
        println!("  leaf     {id} (cluster {}, area {})", leaf.cluster, leaf.area);
    }
    if let Some(props) = tr.entity.and_then(|e| map.properties_of(e)) {
        println!(
            "  entity   {} {}",
            props.classname().unwrap_or("?"),
            props.name().unwrap_or("")
        );
    }
    Ok(())
}
