use onchain_rank::{
    calculate_ranking, evaluate_badges,
    models::{RawActivity, StoredScore, WalletReport},
    rank_from_json,
    scoring::{BadgeEvaluator, RankingEngine, ScoringWeights, ValueComparison},
    store::{ScoreStore, SqliteScoreStore},
    BadgeFamily, NftTransfer, Rank, RankingResult, TokenTransfer, Transaction,
};
use serde_json::json;

fn busy_wallet_transactions(count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|i| {
            Transaction::new(
                &format!("0x{:040x}", i % 120),
                if i % 10 == 0 { "3000000000000000000" } else { "1000" },
                if i % 20 == 0 { "1" } else { "0" },
            )
        })
        .collect()
}

#[test]
fn test_empty_wallet() {
    let result = calculate_ranking(&[], &[], &[]);

    assert_eq!(result.total_points, 0.0);
    assert_eq!(result.rank, Rank::Newbie);
    assert_eq!(result.percentile, 0.0);
    assert!(evaluate_badges(&result).is_empty());
}

#[test]
fn test_active_wallet_ranking_and_badges() {
    let transactions = busy_wallet_transactions(400);
    let tokens: Vec<TokenTransfer> = (0..30)
        .map(|i| TokenTransfer::new(&format!("0xT{:03}", i)))
        .collect();
    let nfts: Vec<NftTransfer> = (0..12)
        .map(|i| NftTransfer::new("0xCollection", &i.to_string()))
        .collect();

    let result = calculate_ranking(&transactions, &tokens, &nfts);

    // 400 * 10 + 380 successful * 5 + 40 high value * 10
    assert_eq!(result.breakdown.transaction_points, 6_300.0);
    assert_eq!(result.breakdown.token_points, 1_500.0);
    assert_eq!(result.breakdown.nft_points, 1_200.0);
    assert_eq!(result.breakdown.unique_contract_points, 3_000.0);
    assert_eq!(result.total_points, 12_000.0);
    assert_eq!(result.rank, Rank::Explorer);
    assert_eq!(result.percentile, 41.67);

    let badges = evaluate_badges(&result);
    let per_family = |family: BadgeFamily| badges.iter().filter(|b| b.family == family).count();
    assert_eq!(per_family(BadgeFamily::Transactions), 3);
    assert_eq!(per_family(BadgeFamily::Tokens), 2);
    assert_eq!(per_family(BadgeFamily::Nfts), 2);
    assert_eq!(per_family(BadgeFamily::Contracts), 3);
}

#[test]
fn test_transaction_master_has_every_transaction_badge() {
    let result = RankingResult {
        stats: onchain_rank::ActivityStats {
            transactions: 5_000,
            ..Default::default()
        },
        ..Default::default()
    };

    let earned: Vec<u64> = BadgeEvaluator::default()
        .evaluate(&result)
        .iter()
        .filter(|b| b.family == BadgeFamily::Transactions)
        .map(|b| b.threshold)
        .collect();
    assert_eq!(earned, vec![40, 200, 400, 1_000, 2_500, 5_000]);
}

#[test]
fn test_rank_from_explorer_payloads() {
    let transactions = json!({
        "status": "1",
        "message": "OK",
        "result": [
            { "blockNumber": "1", "to": "0xAbc0000000000000000000000000000000000001", "value": "2000000000000000000", "isError": "0" },
            { "blockNumber": "2", "to": "0xabc0000000000000000000000000000000000001", "value": "not-a-number", "isError": "0" },
            { "blockNumber": "3", "to": "", "value": "0", "isError": "1" }
        ]
    });
    let tokens = json!({ "status": "0", "message": "No transactions found", "result": [] });
    let nfts = json!([
        { "contractAddress": "0xNFT", "tokenID": "1" },
        { "contractAddress": "0xnft", "tokenID": "1" },
        { "contractAddress": "0xnft" }
    ]);

    let result = rank_from_json(&transactions, &tokens, &nfts);

    assert_eq!(result.stats.transactions, 3);
    assert_eq!(result.stats.contracts, 1);
    assert_eq!(result.stats.tokens, 0);
    assert_eq!(result.stats.nfts, 1);
    // 25 + 15 + 10
    assert_eq!(result.breakdown.transaction_points, 50.0);
    assert_eq!(result.total_points, 175.0);
}

#[test]
fn test_malformed_payload_falls_back_to_default() {
    let result = rank_from_json(&json!([1, 2, 3]), &json!([]), &json!([]));
    assert_eq!(result, RankingResult::default());
}

#[test]
fn test_engine_with_approximate_comparison() {
    let engine = RankingEngine::new(ScoringWeights {
        value_comparison: ValueComparison::Approximate,
        ..Default::default()
    })
    .unwrap();

    let raw = RawActivity::new(
        json!([{ "to": "0x1", "value": "1.2e18", "isError": "0" }]),
        json!(null),
        json!(null),
    );
    let result = engine.calculate_raw(&raw);
    assert_eq!(result.breakdown.transaction_points, 25.0);
}

#[tokio::test]
async fn test_report_round_trips_through_store() {
    let store = SqliteScoreStore::in_memory().await.unwrap();
    let ranking = calculate_ranking(&busy_wallet_transactions(50), &[], &[]);
    let report = WalletReport {
        address: "0x742d35cc6634c0532925a3b844bc9e7595f6e842".to_string(),
        ranking,
        badges: evaluate_badges(&ranking),
        calculated_at: chrono::Utc::now(),
    };

    store.save(&StoredScore::from(&report)).await.unwrap();
    let stored = store.load(&report.address).await.unwrap().unwrap();

    assert_eq!(stored.total_points, ranking.total_points);
    assert_eq!(stored.rank, ranking.rank);
    assert_eq!(stored.stats, ranking.stats);
}
