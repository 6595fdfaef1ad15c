//! Basic usage examples for avldup.

use std::ops::ControlFlow;

use avldup::{DupIndex, DupTree, Endpoint, Thing, TypeCode};

fn main() -> avldup::Result<()> {
    example_tree()?;
    example_index()?;
    example_text()?;
    Ok(())
}

fn example_tree() -> avldup::Result<()> {
    println!("=== DupTree (single-threaded) ===\n");

    let mut tree = DupTree::new(TypeCode::String, TypeCode::Int32, Some("authors"));
    for (author, year) in [("knuth", 1968), ("knuth", 1973), ("wirth", 1976), ("knuth", 1969)] {
        tree.add(&Thing::from(author), &Thing::Int32(year))?;
    }
    println!("{} entries, height {}", tree.len(), tree.height());

    let knuth = Thing::from("knuth");
    let years: Vec<String> = tree.values_for_key(&knuth)?.iter().map(Thing::to_string).collect();
    println!("knuth: {}", years.join(", "));
    println!("after knuth: {:?}", tree.next_larger_key(&knuth)?);
    print!("{}", tree.debug_dump());
    println!();
    Ok(())
}

fn example_index() -> avldup::Result<()> {
    println!("=== DupIndex (thread-safe) ===\n");

    let index = DupIndex::create(TypeCode::Int64, TypeCode::Float64, Some("readings"), 8);
    std::thread::scope(|s| -> avldup::Result<()> {
        let writers: Vec<_> = (0..4i64)
            .map(|sensor| {
                let index = &index;
                s.spawn(move || -> avldup::Result<()> {
                    for t in 0..5 {
                        let reading = sensor as f64 * 10.0 + f64::from(t) / 4.0;
                        index.add(&Thing::Int64(sensor), &Thing::Float64(reading))?;
                    }
                    Ok(())
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer thread panicked")?;
        }
        Ok(())
    })?;
    println!("Count: {}", index.count());

    // Sensors 1 and 2, every reading.
    let (lo, hi) = (Thing::Int64(1), Thing::Int64(2));
    index.iterate(Some(Endpoint::included(&lo)), Some(Endpoint::included(&hi)), |k, v| {
        println!("  sensor {k} -> {v}");
        ControlFlow::Continue(())
    })?;

    index.destroy();
    println!("After destroy: {:?}\n", index.add(&lo, &Thing::Float64(0.0)));
    Ok(())
}

fn example_text() -> avldup::Result<()> {
    println!("=== Text conversion ===\n");

    let pi = Thing::parse("3.141592653589793", TypeCode::Float64)?;
    println!("parsed: {pi}");
    let long = Thing::from("a string too long for the buffer");
    println!("clipped: {}", long.to_text(TypeCode::String, 12)?);
    Ok(())
}
