//! Prints the recovery model at the reference operating points, one value per
//! line: R and B for level 1 at p = 0.75, then the batch quantity across the
//! p sweep for levels 1 and 2.

use turbine_sim::recurrences::RecoveryModel;

fn main() {
    let mut model = RecoveryModel::new();

    println!("{}", model.recovery_prob(1, 0.75));
    println!("{}", model.batch_prob(1, 0.75));

    println!();

    println!("{}", model.batch_prob(1, 0.25));
    println!("{}", model.batch_prob(1, 0.5));
    println!("{}", model.batch_prob(1, 0.75));
    println!("{}", model.batch_prob(1, 1.0));

    println!();

    println!("{}", model.batch_prob(2, 0.25));
    println!("{}", model.batch_prob(2, 0.5));
    println!("{}", model.batch_prob(2, 0.75));
    println!("{}", model.batch_prob(2, 0.95));
    println!("{}", model.batch_prob(2, 1.0));
}
