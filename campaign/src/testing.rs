//! Shared fixtures for unit tests.

use dfund_types::{Address, Timestamp, Wei, SECONDS_PER_DAY};

use crate::campaign::{Campaign, CampaignTerms};
use crate::view::CampaignDetails;

pub const START: u64 = 1_700_000_000;
pub const VOTING_PERIOD: u64 = 3 * SECONDS_PER_DAY;
pub const DURATION: u64 = 30 * SECONDS_PER_DAY;

pub fn creator() -> Address {
    Address::repeat(0xc0)
}

pub fn backer(n: u8) -> Address {
    Address::repeat(n)
}

pub fn at(offset_secs: u64) -> Timestamp {
    Timestamp::new(START + offset_secs)
}

/// 10 ETH target split into [3, 3, 4] ETH.
pub fn campaign() -> Campaign {
    let details = CampaignDetails {
        title: "Test Campaign".into(),
        description: "A test crowdfunding campaign".into(),
        image_hash: "QmTestHash123".into(),
        category: "Technology".into(),
    };
    let terms = CampaignTerms {
        target_amount: Wei::ether(10),
        deadline: at(DURATION),
        voting_period_secs: VOTING_PERIOD,
        milestones: vec![
            ("MVP Development".into(), Wei::ether(3)),
            ("Beta Launch".into(), Wei::ether(3)),
            ("Final Release".into(), Wei::ether(4)),
        ],
    };
    Campaign::new(Address::repeat(0xee), creator(), details, terms, at(0)).unwrap()
}

/// Campaign funded by backer 1 (6 ETH) and backer 2 (4 ETH).
pub fn funded_campaign() -> Campaign {
    let mut c = campaign();
    c.contribute(&backer(1), Wei::ether(6), at(10)).unwrap();
    c.contribute(&backer(2), Wei::ether(4), at(20)).unwrap();
    c
}
