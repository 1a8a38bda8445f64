// Demo driver: seeds a tree with random keys, renders it, then deletes one
// of the keys and renders the result.

use blackwood::{Blackwood, BlackwoodError};
use rand::prelude::*;

fn main() -> Result<(), BlackwoodError> {
    let mut rng = rand::thread_rng();
    let mut tree = Blackwood::new();

    let count = rng.gen_range(15..=55);
    let keys: Vec<i64> = (0..count).map(|_| rng.gen_range(-100..=100)).collect();

    println!("inserting {count} random keys: {keys:?}");
    for &key in &keys {
        tree.insert(key)?;
    }

    println!("\n{tree:?}");
    println!("inorder (key, color): {:?}", tree.inorder());

    let victim = keys[rng.gen_range(0..keys.len())];
    println!("\ndeleting key {victim}");
    tree.remove(&victim);

    println!("\n{tree:?}");
    assert!(tree.is_valid());

    Ok(())
}
