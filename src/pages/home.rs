use leptos::prelude::*;

use crate::components::lineage_tree::{NodeId, NodeSpec, Tree, TreeCanvas, TreeError};

const NUMERALS: [&str; 10] = ["一", "二", "三", "四", "五", "六", "七", "八", "九", "十"];

/// Generation name in Chinese numerals, e.g. 3 -> 三世, 12 -> 十二世.
fn generation(n: usize) -> String {
	let numeral = match n {
		1..=10 => NUMERALS[n - 1].to_owned(),
		11..=19 => format!("十{}", NUMERALS[n - 11]),
		_ => {
			let ones = n % 10;
			let tens = NUMERALS[n / 10 - 1];
			if ones == 0 {
				format!("{tens}十")
			} else {
				format!("{tens}十{}", NUMERALS[ones - 1])
			}
		}
	};
	format!("{numeral}世")
}

/// Parent (as creation number, root = 1) of the `n`-th member added to the sample lineage.
fn sample_parent(n: usize) -> usize {
	match n {
		2..=6 => 1,
		7..=10 => 2,
		11 | 12 => 3,
		13 | 14 => 4,
		15 => 5,
		16 => 6,
		17..=210 => n - 10,
		_ => n - 20,
	}
}

/// Bundled sample genealogy: five sons of the founder, a few grandsons, then
/// single-heir lines, ten of which fork again near the bottom.
fn sample_lineage() -> Result<Tree, TreeError> {
	let mut tree = Tree::new("一世祖")?;
	let mut created: Vec<(NodeId, usize)> = vec![(tree.root().id(), 1)];
	for n in 2..=230 {
		let (parent, depth) = created[sample_parent(n) - 1];
		let serial = if n > 210 { n - 10 } else { n };
		let name = format!("{}{serial}", generation(depth + 1));
		let id = tree.add_child(parent, NodeSpec::new(name))?;
		created.push((id, depth + 1));
	}
	Ok(tree)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (fit, set_fit) = signal(0usize);
	let lineage = sample_lineage().map(|tree| {
		view! {
			<TreeCanvas data=Signal::stored(tree) fullscreen=true fit=fit />
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-tree">
				{lineage}
				<div class="tree-overlay">
					<h1>"家谱"</h1>
					<p class="subtitle">
						"Click to trace a line to the founder. Double-click to fold a branch. Drag or scroll to pan, Ctrl + scroll to zoom."
					</p>
					<button on:click=move |_| set_fit.update(|n| *n += 1)>"Fit"</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generation_names() {
		assert_eq!(generation(1), "一世");
		assert_eq!(generation(10), "十世");
		assert_eq!(generation(12), "十二世");
		assert_eq!(generation(20), "二十世");
		assert_eq!(generation(21), "二十一世");
	}

	#[test]
	fn sample_lineage_shape() {
		let tree = sample_lineage().unwrap();
		assert_eq!(tree.node_count(), 230);
		assert_eq!(tree.root().visible_children().len(), 5);
		assert_eq!(tree.max_level_width(), 16);
		assert_eq!(tree.max_depth(), 23);
		assert_eq!(tree.root().name(), "一世祖");
		assert!(tree.find_by_name("二世2").is_some());
		assert!(tree.find_by_name("二十三世211").is_some());
	}
}
