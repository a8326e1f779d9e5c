use uncertain_closed_itemsets::database::{InMemoryDatabase, Transaction};
use uncertain_closed_itemsets::factory::{MinerFactory, MiningConfig};
use uncertain_closed_itemsets::vocabulary::Vocabulary;

fn main() {
    let vocabulary = Vocabulary::from_names(["bread", "milk", "eggs", "butter"]);
    let transactions = vec![
        Transaction::from_pairs(vec![(0, 0.9), (1, 0.8)]),
        Transaction::from_pairs(vec![(0, 0.7), (2, 0.6)]),
        Transaction::from_pairs(vec![(1, 0.9), (2, 0.8), (3, 0.5)]),
        Transaction::from_pairs(vec![(0, 0.6), (1, 0.6), (3, 0.7)]),
        Transaction::from_pairs(vec![(2, 0.9)]),
    ];
    let database = InMemoryDatabase::new(transactions, vocabulary);

    let config = MiningConfig::new(0.5, 5);
    let results = MinerFactory::mine(&database, &config).expect("mining config is valid");

    println!("The number of results: {}", results.len());
    for item in &results {
        println!(
            "{:?} support={} probability={:.3}",
            item.items.as_slice(),
            item.support,
            item.probability
        );
    }
}
