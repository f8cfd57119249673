//! Fixed token vocabularies used by the validator and the detectors.
//!
//! Latin tokens are lowercase and matched as whole words against a lowercased
//! prompt. Hangul tokens are matched literally, inside words too.

/// Column-name keywords for amount-like columns
pub const AMOUNT_COLUMN: &[&str] = &["amount", "금액", "price", "비용", "amt", "매출", "가격", "sales", "cost"];

/// Phrases asking for the largest values first
pub const TOP_PHRASES: &[&str] = &[
    "top",
    "highest",
    "most expensive",
    "largest",
    "상위",
    "가장 비싼",
    "가장 큰",
    "가장 많은",
    "최고",
    "최대",
    "높은 순",
    "큰 순",
];

/// Suffixes that turn a candidate number into a count ("10개", "10건")
pub const COUNT_SUFFIXES: &[&str] = &["개", "건", "위"];

/// Prefixes that introduce a count ("top 10", "상위 10")
pub const COUNT_PREFIXES: &[&str] = &["top ", "top", "상위 ", "상위"];

pub const REGION_COLUMN: &[&str] = &["region", "지역", "city", "도시", "area", "지점"];

/// Prompt token → stored region value
pub const REGION_VALUES: &[(&str, &str)] = &[
    ("서울", "Seoul"),
    ("seoul", "Seoul"),
    ("부산", "Busan"),
    ("busan", "Busan"),
    ("대구", "Daegu"),
    ("daegu", "Daegu"),
    ("인천", "Incheon"),
    ("incheon", "Incheon"),
    ("광주", "Gwangju"),
    ("gwangju", "Gwangju"),
    ("대전", "Daejeon"),
    ("daejeon", "Daejeon"),
    ("울산", "Ulsan"),
    ("ulsan", "Ulsan"),
    ("세종", "Sejong"),
    ("sejong", "Sejong"),
    ("제주", "Jeju"),
    ("jeju", "Jeju"),
];

pub const CATEGORY_COLUMN: &[&str] = &["category", "카테고리", "분류", "품목", "업종"];

pub const CATEGORY_VALUES: &[(&str, &str)] = &[
    ("식비", "Food"),
    ("food", "Food"),
    ("교통", "Transport"),
    ("transport", "Transport"),
    ("숙박", "Lodging"),
    ("lodging", "Lodging"),
    ("사무용품", "Office"),
    ("office", "Office"),
    ("전자", "Electronics"),
    ("electronics", "Electronics"),
    ("의류", "Clothing"),
    ("clothing", "Clothing"),
];

pub const PAYMENT_COLUMN: &[&str] = &["payment", "결제", "method", "수단", "pay"];

pub const PAYMENT_VALUES: &[(&str, &str)] = &[
    ("카드", "Card"),
    ("card", "Card"),
    ("현금", "Cash"),
    ("cash", "Cash"),
    ("계좌이체", "Transfer"),
    ("이체", "Transfer"),
    ("transfer", "Transfer"),
];

/// Tokens that ask for grouping or aggregation
pub const AGGREGATE_PHRASES: &[&str] = &[
    "그룹",
    "group",
    "별로",
    "별 ",
    "합계",
    "집계",
    "총합",
    "평균",
    "건수",
    "sum",
    "total",
    "aggregate",
    "count",
    "summary",
    "요약",
];

pub const DEPARTMENT_COLUMN: &[&str] = &["dept", "department", "부서"];
pub const STATUS_COLUMN: &[&str] = &["status", "상태"];
pub const DATE_COLUMN: &[&str] = &["date", "날짜", "일자", "month", "월"];
pub const MERCHANT_COLUMN: &[&str] = &["merchant", "가맹점", "거래처", "store", "상호"];

/// Korean "…별" suffix → columns it refers to, tried in order
pub const GROUP_SUFFIXES: &[(&str, &[&str])] = &[
    ("지역별", REGION_COLUMN),
    ("도시별", REGION_COLUMN),
    ("부서별", DEPARTMENT_COLUMN),
    ("카테고리별", CATEGORY_COLUMN),
    ("분류별", CATEGORY_COLUMN),
    ("품목별", CATEGORY_COLUMN),
    ("상태별", STATUS_COLUMN),
    ("결제수단별", PAYMENT_COLUMN),
    ("가맹점별", MERCHANT_COLUMN),
    ("월별", DATE_COLUMN),
    ("날짜별", DATE_COLUMN),
];

/// Group key fallback when no suffix resolves
pub const GENERIC_GROUP_COLUMN: &[&str] = &["category", "department", "dept", "region", "status"];

pub const DETAIL_PHRASES: &[&str] = &["상세", "내역", "detail", "목록", "리스트", "list"];

/// Fields the detail table shows, in order
pub const DETAIL_FIELDS: &[&str] = &["Date", "Merchant", "Amount", "Status"];

/// Output label for summed amounts
pub const SUM_LABEL: &str = "합계";

/// Output label for row counts
pub const COUNT_LABEL: &str = "건수";

/// Tokens that mark a prompt as carrying some intent
pub const INTENT_TOKENS: &[&str] = &[
    // actions
    "필터", "정렬", "그룹", "보여", "추출", "계산", "요약", "분석", "찾아", "만들어", "변환", "합쳐",
    "filter", "sort", "group", "show", "list", "calculate", "extract", "find", "summar", "analy",
    // comparisons
    "이상", "이하", "초과", "미만", "보다", "높은", "낮은", "상위", "하위", "최대", "최소", "가장",
    "top", "highest", "lowest", "greater", "less", "most", "least",
    // domain nouns
    "매출", "금액", "비용", "가격", "지역", "부서", "카테고리", "상태", "날짜", "거래", "가맹점", "결제",
    "합계", "평균", "건수", "내역", "상세", "보고서", "데이터",
    "amount", "sales", "price", "cost", "region", "category", "status", "date", "merchant", "payment",
    "total", "sum", "average", "count", "detail", "report", "data",
    // cities
    "서울", "부산", "대구", "인천", "광주", "대전", "울산", "세종", "제주",
    "seoul", "busan", "daegu", "incheon", "gwangju", "daejeon", "ulsan", "sejong", "jeju",
    // numeric units
    "만원", "천원", "억", "개월", "퍼센트", "percent",
];
