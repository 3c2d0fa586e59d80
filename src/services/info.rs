//! Federation information served to the home page

use crate::models::{Discipline, FederationContacts, FederationInfo, HistoryEntry};
use once_cell::sync::Lazy;

static FEDERATION_INFO: Lazy<FederationInfo> = Lazy::new(|| FederationInfo {
    full_name: "Региональная физкультурно-спортивная общественная организация \
                «Федерация спортивного программирования по Чувашской Республике»"
        .to_string(),
    short_name: "РФСОО «ФСП по Чувашской Республике»".to_string(),
    informal_names: [
        "Федерация спортивного программирования по Чувашской Республике",
        "ФСП по Чувашской Республике",
        "ФСП Чувашии",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect(),
    description: "Спортивное программирование – это инновационный вид спорта, где участникам \
                  необходимо реализовать качественную программу или алгоритм в условиях \
                  ограниченного времени."
        .to_string(),
    disciplines: [
        (
            "Программирование алгоритмическое",
            "Решение группы задач путем написания наиболее оптимальных программных \
             алгоритмов в условиях ограниченного времени.",
            "algorithm",
        ),
        (
            "Программирование продуктовое (хакатон)",
            "Создание программных продуктов (приложений, сайтов, сервисов), отвечающих \
             заданным требованиям и выполняющих определенные прикладные задачи.",
            "product",
        ),
        (
            "Программирование систем информационной безопасности",
            "Комплекс соревнований в области кибербезопасности, включающий в себя поиск и \
             устранение системных уязвимостей, отработку кибератак и защиты от них.",
            "security",
        ),
        (
            "Программирование робототехники",
            "Написание кода и поведенческих алгоритмов для автономных роботов, \
             соревнующихся по определенным правилам.",
            "robotics",
        ),
        (
            "Программирование БАС",
            "Написание кода для автономного полета дрона или роя дронов, а также выполнения \
             им поставленных задач в условиях соревновательного полигона.",
            "drone",
        ),
    ]
    .iter()
    .map(|(name, description, icon)| Discipline {
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    })
    .collect(),
    history: [
        ("19 октября 2021", "Дата основания Федерации спортивного программирования России"),
        ("12 апреля 2022", "Спортивное программирование было официально признано видом спорта"),
        ("28 декабря 2022", "Создано Региональное отделение ФСП России в Чувашии"),
        ("03 июля 2025", "ФСП Чувашии получило статус юридического лица"),
    ]
    .iter()
    .map(|(date, event)| HistoryEntry {
        date: date.to_string(),
        event: event.to_string(),
    })
    .collect(),
    contacts: FederationContacts {
        telegram: "https://t.me/fspchuv".to_string(),
        email: "chuvashia@fsp-russia.ru".to_string(),
    },
});

pub fn federation_info() -> &'static FederationInfo {
    &FEDERATION_INFO
}
