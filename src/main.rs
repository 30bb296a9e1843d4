//! Browser entry point: mounts [`App`] into the page body.

use leptos::prelude::*;
use lineage_tree_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(|| {
		view! { <App /> }
	})
}
