//! Default records served when a profile has nothing persisted yet.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{PinLevel, Post, Reply, User};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or_default()
}

fn seed_user(id: &str, username: &str, password: &str, (registered, last_login): (DateTime<Utc>, DateTime<Utc>), ip: &str, points: i64, is_admin: bool) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        email: None,
        register_time: registered,
        last_login_time: last_login,
        login_ip: ip.to_string(),
        points,
        is_admin,
        is_active: true,
    }
}

/// One administrator and two regular members.
pub fn default_users() -> Vec<User> {
    vec![
        seed_user("1", "admin", "admin123", (at(2024, 1, 1, 10, 0), at(2024, 1, 20, 15, 30)), "192.168.1.100", 1000, true),
        seed_user("2", "张三", "123456", (at(2024, 1, 5, 14, 20), at(2024, 1, 19, 9, 15)), "192.168.1.101", 150, false),
        seed_user("3", "李四", "123456", (at(2024, 1, 10, 16, 45), at(2024, 1, 18, 20, 0)), "192.168.1.102", 280, false),
    ]
}

struct Listing {
    id: &'static str,
    title: &'static str,
    content: &'static str,
    price: f64,
    author: (&'static str, &'static str),
    created: DateTime<Utc>,
    sold_content: &'static str,
}

impl Listing {
    fn into_post(self, replies: Vec<Reply>) -> Post {
        Post {
            id: self.id.to_string(),
            title: self.title.to_string(),
            content: self.content.to_string(),
            price: Some(self.price),
            author_id: self.author.0.to_string(),
            author_name: self.author.1.to_string(),
            create_time: self.created,
            pinned_level: PinLevel::None,
            color_tag: None,
            is_for_sale: true,
            sold_content: Some(self.sold_content.to_string()),
            replies,
        }
    }
}

/// Four for-sale listings; the second one carries a reply from the admin.
pub fn default_posts() -> Vec<Post> {
    let macbook = Listing {
        id: "2",
        title: "MacBook Pro M3 14寸 512GB 9成新",
        content: "MacBook Pro M3 14寸，512GB存储，9成新，无磕碰无维修。此内容为出售内容，购买后可查看详细配置和联系方式。",
        price: 12800.0,
        author: ("2", "张三"),
        created: at(2024, 1, 19, 15, 20),
        sold_content: "详细配置：M3芯片、16GB内存、512GB SSD。购买时间2023年10月，发票齐全。联系QQ：987654321",
    };
    let xiaomi = Listing {
        id: "3",
        title: "小米13 Ultra 黑色 256GB 个人自用",
        content: "小米13 Ultra 黑色256GB，个人自用9个月，成色很好。此内容为出售内容，包含徕卡相机套装。",
        price: 3200.0,
        author: ("3", "李四"),
        created: at(2024, 1, 18, 20, 15),
        sold_content: "包含原装充电器、数据线、保护壳。徕卡相机套装完整。微信：xiaomi_seller",
    };
    let switch = Listing {
        id: "4",
        title: "Nintendo Switch OLED 白色 全套配件",
        content: "Nintendo Switch OLED 白色版本，全套原装配件，购买6个月。此内容为出售内容。",
        price: 1800.0,
        author: ("2", "张三"),
        created: at(2024, 1, 17, 14, 30),
        sold_content: "包含主机、手柄、充电器、说明书等全套配件。送10个游戏卡带。QQ：switch_game",
    };
    let ipad = Listing {
        id: "5",
        title: "iPad Air 5 64GB WiFi版 银色",
        content: "iPad Air 5代 64GB WiFi版银色，购买1年，平时主要看视频用。此内容为出售内容。",
        price: 3500.0,
        author: ("3", "李四"),
        created: at(2024, 1, 16, 11, 45),
        sold_content: "配原装充电器和数据线，送钢化膜和保护套。成色95新。联系方式：ipad_seller@email.com",
    };

    let battery_question = Reply {
        id: "3".to_string(),
        post_id: "3".to_string(),
        content: "电池健康度怎么样？".to_string(),
        author_id: "1".to_string(),
        author_name: "admin".to_string(),
        create_time: at(2024, 1, 19, 8, 0),
    };

    vec![
        macbook.into_post(Vec::new()),
        xiaomi.into_post(vec![battery_question]),
        switch.into_post(Vec::new()),
        ipad.into_post(Vec::new()),
    ]
}
