//! Nature classification for group and ledger names
//!
//! Source exports rarely carry an explicit asset/liability/income/expense
//! marker, so the nature is inferred from the name. The rules live in one
//! ordered table; the first matching rule wins, and the order is significant:
//! "Sundry Creditors" must hit the sundry-creditor rule before the generic
//! "creditor" fallback further down.

use crate::types::Nature;

/// One classification rule: matches when the lowercased name contains any of
/// `any` and none of `none`
struct Rule {
    any: &'static [&'static str],
    none: &'static [&'static str],
    nature: Nature,
}

const RULES: &[Rule] = &[
    // Most specific party groups first
    Rule {
        any: &["sundry creditor"],
        none: &[],
        nature: Nature::Liability,
    },
    Rule {
        any: &["sundry debtor"],
        none: &[],
        nature: Nature::Asset,
    },
    Rule {
        any: &["capital"],
        none: &[],
        nature: Nature::Liability,
    },
    // Standard asset groups
    Rule {
        any: &[
            "current asset",
            "fixed asset",
            "bank",
            "cash",
            "deposit",
            "loans & advances",
            "stock-in-hand",
            "inventory",
        ],
        none: &[],
        nature: Nature::Asset,
    },
    // Standard liability groups ("loans & advances" above must win over the
    // bare "loan" here)
    Rule {
        any: &[
            "current liabilit",
            "duties & taxes",
            "provision",
            "loan",
            "outstanding",
            "payable",
        ],
        none: &[],
        nature: Nature::Liability,
    },
    // Income and expense account groups
    Rule {
        any: &["direct income", "indirect income", "sales account", "revenue", "income"],
        none: &[],
        nature: Nature::Income,
    },
    Rule {
        any: &["direct expense", "indirect expense", "purchase account", "expenses"],
        none: &[],
        nature: Nature::Expense,
    },
    // Generic substrings
    Rule {
        any: &["asset"],
        none: &[],
        nature: Nature::Asset,
    },
    Rule {
        any: &["liabilit"],
        none: &[],
        nature: Nature::Liability,
    },
    // Bare "sales"/"purchase" only when the name is not a party group
    Rule {
        any: &["sales"],
        none: &["creditor", "debtor"],
        nature: Nature::Income,
    },
    Rule {
        any: &["purchase"],
        none: &["creditor", "debtor"],
        nature: Nature::Expense,
    },
    Rule {
        any: &["branch", "division"],
        none: &[],
        nature: Nature::Asset,
    },
    // Party fallbacks
    Rule {
        any: &["creditor"],
        none: &[],
        nature: Nature::Liability,
    },
    Rule {
        any: &["debtor"],
        none: &[],
        nature: Nature::Asset,
    },
];

/// Classify a group or ledger name into its accounting nature
///
/// Falls back to [`Nature::Expense`] when nothing matches, which is the
/// least damaging default for unrecognized operational groups.
pub fn classify_nature(name: &str) -> Nature {
    let lowered = name.to_lowercase();
    for rule in RULES {
        let hit = rule.any.iter().any(|pattern| lowered.contains(pattern));
        let blocked = rule.none.iter().any(|pattern| lowered.contains(pattern));
        if hit && !blocked {
            return rule.nature;
        }
    }
    Nature::Expense
}
