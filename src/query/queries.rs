// region:    --- Users
/// 사용자 생성
pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, password, email, full_name, location, is_service_provider, preferred_language)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

/// 사용자 조회
pub const GET_USER: &str = "SELECT * FROM users WHERE id = $1";

/// 아이디로 사용자 조회
pub const GET_USER_BY_USERNAME: &str = "SELECT * FROM users WHERE username = $1";

/// 사용자 정보 수정 (NULL 인자는 기존 값 유지)
pub const UPDATE_USER: &str = r#"
    UPDATE users SET
        full_name = COALESCE($2, full_name),
        location = COALESCE($3, location),
        preferred_language = COALESCE($4, preferred_language),
        is_service_provider = COALESCE($5, is_service_provider)
    WHERE id = $1
    RETURNING *
"#;

/// 서비스 제공자 표시
pub const MARK_SERVICE_PROVIDER: &str =
    "UPDATE users SET is_service_provider = TRUE WHERE id = $1 AND is_service_provider = FALSE";

/// 관리자 권한 변경
pub const SET_USER_ADMIN: &str = "UPDATE users SET is_admin = $2 WHERE id = $1 RETURNING *";

/// 사용자 목록
pub const LIST_USERS: &str = "SELECT * FROM users ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2";

pub const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";
// endregion: --- Users

// region:    --- Sessions
/// 세션 생성
pub const INSERT_SESSION: &str =
    "INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3) RETURNING *";

/// 세션 조회
pub const GET_SESSION: &str = "SELECT * FROM sessions WHERE token = $1";

/// 세션 삭제
pub const DELETE_SESSION: &str = "DELETE FROM sessions WHERE token = $1";

/// 만료 세션 정리
pub const DELETE_EXPIRED_SESSIONS: &str = "DELETE FROM sessions WHERE expires_at <= $1";
// endregion: --- Sessions

// region:    --- Resources
/// 자료 목록 ($1 분류, $2 필수 태그, $3 추천 여부)
pub const LIST_RESOURCES: &str = r#"
    SELECT * FROM resources
    WHERE ($1::text IS NULL OR category = $1)
      AND ($2::text[] IS NULL OR tags @> $2)
      AND ($3::bool IS NULL OR is_featured = $3)
    ORDER BY is_featured DESC, created_at DESC, id DESC
    LIMIT $4 OFFSET $5
"#;

pub const COUNT_RESOURCES: &str = r#"
    SELECT COUNT(*) FROM resources
    WHERE ($1::text IS NULL OR category = $1)
      AND ($2::text[] IS NULL OR tags @> $2)
      AND ($3::bool IS NULL OR is_featured = $3)
"#;

/// 추천 자료
pub const LIST_FEATURED_RESOURCES: &str = r#"
    SELECT * FROM resources
    WHERE is_featured = TRUE
    ORDER BY download_count DESC, created_at DESC
    LIMIT $1
"#;

/// 자료 조회
pub const GET_RESOURCE: &str = "SELECT * FROM resources WHERE id = $1";

/// 자료 생성
pub const INSERT_RESOURCE: &str = r#"
    INSERT INTO resources (title, description, category, tags, image_url, download_url, download_file,
                           how_to_use, assembly_instructions, is_featured, is_crawled, source_site)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    RETURNING *
"#;

/// 자료 수정 (NULL 인자는 기존 값 유지)
pub const UPDATE_RESOURCE: &str = r#"
    UPDATE resources SET
        title = COALESCE($2, title),
        description = COALESCE($3, description),
        category = COALESCE($4, category),
        tags = COALESCE($5, tags),
        image_url = COALESCE($6, image_url),
        download_url = COALESCE($7, download_url),
        download_file = COALESCE($8, download_file),
        how_to_use = COALESCE($9, how_to_use),
        assembly_instructions = COALESCE($10, assembly_instructions),
        source_site = COALESCE($11, source_site)
    WHERE id = $1
    RETURNING *
"#;

/// 자료 삭제
pub const DELETE_RESOURCE: &str = "DELETE FROM resources WHERE id = $1";

/// 추천 여부 변경
pub const SET_RESOURCE_FEATURED: &str =
    "UPDATE resources SET is_featured = $2 WHERE id = $1 RETURNING *";

/// 다운로드 수 증가 (행 잠금)
pub const INCREMENT_DOWNLOAD_COUNT: &str =
    "UPDATE resources SET download_count = download_count + 1 WHERE id = $1 RETURNING *";
// endregion: --- Resources

// region:    --- Services
/// 서비스 목록 ($1 종류, $2 태그)
pub const LIST_SERVICES: &str = r#"
    SELECT * FROM services
    WHERE ($1::text IS NULL OR service_type = $1)
      AND ($2::text IS NULL OR $2 = ANY(tags))
    ORDER BY is_verified DESC, rating DESC, created_at DESC, id DESC
    LIMIT $3 OFFSET $4
"#;

pub const COUNT_SERVICES: &str = r#"
    SELECT COUNT(*) FROM services
    WHERE ($1::text IS NULL OR service_type = $1)
      AND ($2::text IS NULL OR $2 = ANY(tags))
"#;

/// 경계 상자 안의 모든 서비스 (정확한 거리와 정렬은 호출 측에서 계산)
/// 경도는 날짜변경선에서 나뉜 두 구간 중 하나에 들면 된다.
pub const LIST_SERVICES_IN_BOX: &str = r#"
    SELECT * FROM services
    WHERE ($1::text IS NULL OR service_type = $1)
      AND ($2::text IS NULL OR $2 = ANY(tags))
      AND (location->>'lat')::float8 BETWEEN $3 AND $4
      AND ((location->>'long')::float8 BETWEEN $5 AND $6
           OR (location->>'long')::float8 BETWEEN $7 AND $8)
"#;

/// 서비스 조회
pub const GET_SERVICE: &str = "SELECT * FROM services WHERE id = $1";

/// 서비스 조회 (평점 갱신용 행 잠금)
pub const GET_SERVICE_FOR_UPDATE: &str = "SELECT * FROM services WHERE id = $1 FOR UPDATE";

/// 서비스 생성
pub const INSERT_SERVICE: &str = r#"
    INSERT INTO services (user_id, title, description, service_type, location, tags, image_url,
                          printer_model, materials, specialty, hourly_rate, contact_phone, contact_email)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
    RETURNING *
"#;

/// 서비스 수정 (NULL 인자는 기존 값 유지)
pub const UPDATE_SERVICE: &str = r#"
    UPDATE services SET
        title = COALESCE($2, title),
        description = COALESCE($3, description),
        service_type = COALESCE($4, service_type),
        location = COALESCE($5, location),
        tags = COALESCE($6, tags),
        image_url = COALESCE($7, image_url),
        printer_model = COALESCE($8, printer_model),
        materials = COALESCE($9, materials),
        specialty = COALESCE($10, specialty),
        hourly_rate = COALESCE($11, hourly_rate),
        contact_phone = COALESCE($12, contact_phone),
        contact_email = COALESCE($13, contact_email)
    WHERE id = $1
    RETURNING *
"#;

/// 서비스 삭제
pub const DELETE_SERVICE: &str = "DELETE FROM services WHERE id = $1";

/// 평점 갱신
pub const UPDATE_SERVICE_RATING: &str =
    "UPDATE services SET rating = $2, rating_count = $3 WHERE id = $1 RETURNING *";

/// 인증 여부 변경
pub const SET_SERVICE_VERIFIED: &str =
    "UPDATE services SET is_verified = $2 WHERE id = $1 RETURNING *";
// endregion: --- Services

// region:    --- Auctions
/// 경매 목록 ($1 상태, $2 종류, $3 태그)
pub const LIST_AUCTIONS: &str = r#"
    SELECT * FROM auctions
    WHERE ($1::text IS NULL OR status = $1)
      AND ($2::text IS NULL OR auction_type = $2)
      AND ($3::text IS NULL OR $3 = ANY(tags))
    ORDER BY created_at DESC, id DESC
    LIMIT $4 OFFSET $5
"#;

pub const COUNT_AUCTIONS: &str = r#"
    SELECT COUNT(*) FROM auctions
    WHERE ($1::text IS NULL OR status = $1)
      AND ($2::text IS NULL OR auction_type = $2)
      AND ($3::text IS NULL OR $3 = ANY(tags))
"#;

/// 경매 조회
pub const GET_AUCTION: &str = "SELECT * FROM auctions WHERE id = $1";

/// 경매 생성
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (user_id, title, description, auction_type, location, tags, deadline)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    RETURNING *
"#;

/// 입찰 번호 선발급 (이벤트에 먼저 기록하기 위해)
pub const NEXT_BID_ID: &str = "SELECT nextval(pg_get_serial_sequence('bids', 'id'))";

/// 입찰 기록
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (id, auction_id, user_id, amount, description, created_at)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

/// 입찰 집계 반영 (진행 중이고 마감 전일 때만)
pub const APPLY_BID_TO_AUCTION: &str = r#"
    UPDATE auctions SET
        bid_count = bid_count + 1,
        current_lowest_bid = LEAST(COALESCE(current_lowest_bid, $2), $2)
    WHERE id = $1 AND status = 'active' AND deadline > $3
    RETURNING *
"#;

/// 경매 입찰 목록 (최저가 순)
pub const LIST_BIDS: &str = r#"
    SELECT * FROM bids
    WHERE auction_id = $1
    ORDER BY amount ASC, created_at ASC, id ASC
"#;

/// 입찰 조회
pub const GET_BID: &str = "SELECT * FROM bids WHERE id = $1 AND auction_id = $2";

/// 최저 입찰
pub const GET_LOWEST_BID: &str = r#"
    SELECT * FROM bids
    WHERE auction_id = $1
    ORDER BY amount ASC, created_at ASC, id ASC
    LIMIT 1
"#;

/// 입찰 집계 재계산
pub const GET_BID_AGGREGATES: &str =
    "SELECT COUNT(*)::INT4 AS bid_count, MIN(amount) AS lowest_bid FROM bids WHERE auction_id = $1";

/// 경매 완료
pub const COMPLETE_AUCTION: &str = r#"
    UPDATE auctions SET status = 'completed', winning_bid_id = $2
    WHERE id = $1 AND status = 'active'
    RETURNING *
"#;

/// 경매 취소
pub const CANCEL_AUCTION: &str = r#"
    UPDATE auctions SET status = 'cancelled'
    WHERE id = $1 AND status = 'active'
    RETURNING *
"#;

/// 마감이 지난 진행 중 경매
pub const LIST_EXPIRED_AUCTIONS: &str = r#"
    SELECT id FROM auctions
    WHERE status = 'active' AND deadline <= $1
    ORDER BY deadline ASC
    LIMIT 100
"#;
// endregion: --- Auctions

// region:    --- Payments
/// 결제 생성
pub const INSERT_PAYMENT: &str = r#"
    INSERT INTO payments (user_id, provider, order_id, order_name, amount, currency)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

/// 주문 번호로 결제 조회
pub const GET_PAYMENT_BY_ORDER: &str = "SELECT * FROM payments WHERE order_id = $1";

/// 사용자 결제 목록
pub const LIST_USER_PAYMENTS: &str =
    "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC";

/// 결제사 참조값 저장
pub const SET_PAYMENT_REFERENCE: &str =
    "UPDATE payments SET provider_reference = $2 WHERE id = $1 RETURNING *";

/// 결제 상태 변경 (대기 중인 결제만)
pub const UPDATE_PAYMENT_STATUS: &str = r#"
    UPDATE payments SET
        status = $2,
        provider_reference = COALESCE($3, provider_reference),
        approved_at = CASE WHEN $2 = 'approved' THEN NOW() ELSE approved_at END
    WHERE order_id = $1 AND status = 'pending'
    RETURNING *
"#;
// endregion: --- Payments

// region:    --- Uploads
/// 업로드 기록
pub const INSERT_UPLOAD: &str = r#"
    INSERT INTO uploads (id, user_id, original_name, stored_name, content_type, size)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING *
"#;

/// 업로드 조회
pub const GET_UPLOAD: &str = "SELECT * FROM uploads WHERE id = $1";
// endregion: --- Uploads

// region:    --- Search
/// 트라이그램 자료 검색
pub const SEARCH_RESOURCES_TRGM: &str = r#"
    SELECT * FROM resources
    WHERE lower(title) % $1 OR $1 <% lower(title || ' ' || description)
    ORDER BY GREATEST(similarity(lower(title), $1), word_similarity($1, lower(title || ' ' || description))) DESC,
             id DESC
    LIMIT $2 OFFSET $3
"#;

/// 부분 문자열 자료 검색
pub const SEARCH_RESOURCES_LIKE: &str = r#"
    SELECT * FROM resources
    WHERE lower(title || ' ' || description) LIKE $1 ESCAPE '\'
    ORDER BY created_at DESC, id DESC
    LIMIT $2 OFFSET $3
"#;

/// 트라이그램 서비스 검색
pub const SEARCH_SERVICES_TRGM: &str = r#"
    SELECT * FROM services
    WHERE lower(title) % $1 OR $1 <% lower(title || ' ' || description)
    ORDER BY GREATEST(similarity(lower(title), $1), word_similarity($1, lower(title || ' ' || description))) DESC,
             id DESC
    LIMIT $2 OFFSET $3
"#;

/// 부분 문자열 서비스 검색
pub const SEARCH_SERVICES_LIKE: &str = r#"
    SELECT * FROM services
    WHERE lower(title || ' ' || description) LIKE $1 ESCAPE '\'
    ORDER BY created_at DESC, id DESC
    LIMIT $2 OFFSET $3
"#;
// endregion: --- Search

// region:    --- Admin
/// 관리자 통계
pub const GET_ADMIN_STATS: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM users) AS users,
        (SELECT COUNT(*) FROM users WHERE is_service_provider) AS service_providers,
        (SELECT COUNT(*) FROM resources) AS resources,
        (SELECT COALESCE(SUM(download_count), 0)::INT8 FROM resources) AS downloads,
        (SELECT COUNT(*) FROM services) AS services,
        (SELECT COUNT(*) FROM auctions WHERE status = 'active') AS active_auctions,
        (SELECT COUNT(*) FROM bids) AS bids,
        (SELECT COUNT(*) FROM payments WHERE status = 'approved') AS approved_payments
"#;
// endregion: --- Admin
