use crate::table::Table;

/// Display a preview of a table: first and last rows plus per-column summary
pub fn display_table(table: &Table) {
    if table.is_empty() {
        println!("No data to display");
        return;
    }

    let names: Vec<&str> = table.names().collect();
    let width = 16 * (names.len() + 1);

    println!("\n{}", "=".repeat(width));
    println!("                TABLE PREVIEW");
    println!("{}", "=".repeat(width));

    // Header
    print!("{:<8}", "Row");
    for name in &names {
        print!(" {:>15}", name);
    }
    println!();
    println!("{}", "-".repeat(width));

    let rows = table.num_rows();

    println!("=== FIRST 10 ROWS ===");
    for row in 0..rows.min(10) {
        print_row(table, &names, row);
    }

    if rows > 10 {
        println!("\n=== LAST 10 ROWS ===");
        for row in rows.saturating_sub(10)..rows {
            print_row(table, &names, row);
        }
    }

    println!("{}", "=".repeat(width));
    println!("Total rows: {}", rows);

    // Per-column summary
    for name in &names {
        if let Some(values) = table.column(name) {
            let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
            let mean = if defined.is_empty() {
                f64::NAN
            } else {
                defined.iter().sum::<f64>() / defined.len() as f64
            };
            println!(
                "{}: mean {:.6}, undefined rows {} ({:.2}%)",
                name,
                mean,
                values.len() - defined.len(),
                100.0 * (values.len() - defined.len()) as f64 / values.len().max(1) as f64
            );
        }
    }
    println!("{}", "=".repeat(width));
}

fn print_row(table: &Table, names: &[&str], row: usize) {
    print!("{:<8}", row);
    for name in names {
        let value = table.column(name).and_then(|c| c.get(row)).copied();
        match value {
            Some(v) if v.is_nan() => print!(" {:>15}", "NaN"),
            // Adaptive precision keeps small and large magnitudes readable
            Some(v) if v.abs() < 1.0 => print!(" {:>15.8}", v),
            Some(v) if v.abs() < 100.0 => print!(" {:>15.6}", v),
            Some(v) => print!(" {:>15.4}", v),
            None => print!(" {:>15}", "-"),
        }
    }
    println!();
}
