use anyhow::{Context, Result, ensure};
use tilepress_core::{GeoBBox, Mercator, TileScheme};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// bounding box to cover
	#[arg(value_name = "lon_min,lat_min,lon_max,lat_max", allow_hyphen_values = true)]
	bbox: String,

	/// minimum zoom level
	#[arg(long, value_name = "int", default_value_t = 0)]
	min_zoom: u8,

	/// maximum zoom level
	#[arg(long, value_name = "int", default_value_t = 5)]
	max_zoom: u8,

	/// row numbering scheme of the printed tiles
	#[arg(long, value_name = "xyz|tms", default_value = "xyz")]
	scheme: String,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let scheme = arguments.scheme.parse::<TileScheme>()?;
	ensure!(
		arguments.min_zoom <= arguments.max_zoom,
		"min zoom ({}) must not exceed max zoom ({})",
		arguments.min_zoom,
		arguments.max_zoom
	);

	let values = arguments
		.bbox
		.split(&[' ', ',', ';'])
		.filter(|s| !s.is_empty())
		.map(|s| s.parse::<f64>().with_context(|| format!("bbox value '{s}' is not a number")))
		.collect::<Result<Vec<f64>>>()?;
	let bbox = GeoBBox::try_from(values)?;

	let levels: Vec<u8> = (arguments.min_zoom..=arguments.max_zoom).collect();
	for tile in Mercator::default().tiles_covering(&bbox, &levels, scheme)? {
		println!("{}/{}/{}", tile.level, tile.x, tile.y);
	}
	Ok(())
}
