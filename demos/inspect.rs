use std::path::PathBuf;

use clap::Parser;
use skele::formats::stringify_document;
use skele::render::PropsInterner;
use skele::storage::{load_document, AssetRoot, FsStorage};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
	#[arg(help = "Path to the rig document (.json)")]
	doc_path: PathBuf,
	#[arg(long, num_args = 4, value_names = ["X", "Y", "SIZE", "DIRECTION"], allow_negative_numbers = true)]
	#[arg(help = "Place the root before rendering", default_values_t = [0., 0., 1., 0.])]
	place: Vec<f32>,
	#[arg(long, help = "Blend factor between the last two ticks", default_value_t = 1.)]
	blend: f32,
	#[arg(long, help = "Also list sprites found in this directory")]
	assets: Option<PathBuf>,
	#[arg(long, help = "Print the document as it would be saved")]
	normalized: bool,
}

fn main() {
	tracing_subscriber::fmt::init();

	let cli = Cli::parse();
	let storage = FsStorage::new(".");

	let doc = load_document(&storage, &cli.doc_path).unwrap();
	let mut skele = doc.to_skeleton();

	println!("== Document ==");
	println!("name: {}", doc.name.as_deref().unwrap_or("(unnamed)"));
	if let Some(description) = &doc.description {
		println!("description: {description}");
	}
	println!("== Nodes ==\n{skele}");

	let [x, y, size, direction] = [cli.place[0], cli.place[1], cli.place[2], cli.place[3]];
	skele.tick_root();
	skele.tick_move(x, y, size, direction);

	let mut interner = PropsInterner::new();
	let infos = skele.render(cli.blend, &mut |props| interner.intern(props));
	println!("== Sprites ({}, {} distinct props) ==", infos.len(), interner.len());
	for info in &infos {
		println!(
			"{} at ({:.2}, {:.2}) size {:.2} facing {:.1}° sort {}",
			info.uri, info.center.x, info.center.y, info.transform.x, info.direction, info.sort
		);
	}

	if let Some(dir) = cli.assets {
		let scheme = dir
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| "sprite".to_owned());
		let uris = AssetRoot::new(scheme, dir).scan(&storage);
		println!("== Assets ({}) ==", uris.len());
		for uri in uris {
			println!("{uri}");
		}
	}

	if cli.normalized {
		println!("== Normalized ==");
		let saved = skele::formats::SkeleDocument {
			skele: skele.to_data(),
			..doc
		};
		println!("{}", stringify_document(&saved));
	}
}
