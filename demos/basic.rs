use chrono::Local;
use cronwalk::Schedule;

fn main() {
    // Every Friday at 18:00, seconds included.
    let schedule = Schedule::new("0 0 18 * * fri *").expect("valid schedule");

    let now = Local::now();
    let matches = schedule.matches(&now);

    let next = schedule.find_next(&now, false).unwrap();

    println!("Current time is: {now}");
    println!(
        "Pattern \"{schedule}\" does {} time {now}",
        if matches { "match" } else { "not match" }
    );
    println!("Pattern \"{schedule}\" will next match at {next:?}");

    println!("Next 5 matches:");
    for time in schedule.iter_after(&now, false).take(5) {
        println!("{time}");
    }
}
