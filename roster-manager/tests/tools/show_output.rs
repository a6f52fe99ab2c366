use roster_manager_lib::application::dto::MonthGridDto;

pub fn show_month_grid_debug_data(grid: &MonthGridDto) {
    println!("\n=======================================================");
    println!("[DEBUG] {} ({} weeks)", grid.title, grid.weeks.len());
    println!("=======================================================");
    println!("{}", ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"].join("     "));

    for week in &grid.weeks {
        let row: Vec<String> = week
            .days
            .iter()
            .map(|cell| match cell {
                Some(day) => format!(
                    "{:>2} {:<5}",
                    &day.date[8..],
                    day.role.as_deref().unwrap_or("-")
                ),
                None => " ".repeat(8),
            })
            .collect();
        println!("{}", row.join(""));
    }
    println!("=======================================================\n");
}

pub fn show_history_debug_data(lines: &[String]) {
    println!("\n[DEBUG] swap log ({} entries)", lines.len().saturating_sub(1));
    for line in lines {
        println!("   {}", line);
    }
}
